// api-server/src/api/mod.rs
pub mod auth;
pub mod course;

use actix_web::{HttpRequest, HttpResponse};
use common::ActorError;

use crate::actors::keyed::Registry;
use crate::actors::session_actor::{IsValid, SessionActor};

// Request headers carrying the session credentials
pub const TOKEN_HEADER: &str = "TOKEN";
pub const WALLET_ID_HEADER: &str = "WALLET_ID";

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::account),
    )
    .service(
        actix_web::web::scope("/course")
            .service(course::check)
            .service(course::upload)
            .service(course::publish),
    );
}

/// Authenticated-request boundary: both credential headers must be present
/// and the token must match the identity's current session exactly. Returns
/// the verified identity, or the response to send instead.
pub async fn authorize(
    req: &HttpRequest,
    sessions: &Registry<SessionActor>,
) -> Result<String, HttpResponse> {
    let token = match header_value(req, TOKEN_HEADER) {
        Some(token) => token,
        None => return Err(HttpResponse::Unauthorized().finish()),
    };
    let identity = match header_value(req, WALLET_ID_HEADER) {
        Some(identity) => identity,
        None => return Err(HttpResponse::Unauthorized().finish()),
    };

    match sessions.addr(&identity).send(IsValid { token }).await {
        Ok(Ok(true)) => Ok(identity),
        Ok(Ok(false)) => Err(HttpResponse::Unauthorized().finish()),
        Ok(Err(e)) => Err(internal_error(&identity, &e)),
        Err(e) => {
            tracing::error!("session mailbox for {}: {}", identity, e);
            Err(HttpResponse::InternalServerError().finish())
        }
    }
}

/// Log an actor fault with context and answer with an opaque failure;
/// internal details never reach the external caller.
pub fn internal_error(identity: &str, e: &ActorError) -> HttpResponse {
    tracing::error!("internal fault for {}: {}", identity, e);
    HttpResponse::InternalServerError().finish()
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
}

/// Aliases for the registries carried in app data
pub type SessionRegistry = Registry<SessionActor>;
pub type AccountRegistry = Registry<crate::actors::account_actor::AccountActor>;
pub type ContentRegistry = Registry<crate::actors::content_actor::ContentActor>;
