// api-server/src/api/auth.rs
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use common::models::RegisterRequest;
use common::{AuthError, Config};
use std::sync::Arc;

use super::{authorize, internal_error, AccountRegistry, SessionRegistry};
use crate::actors::account_actor::{GetAccount, Register, RegisterOutcome};
use crate::auth::handshake::{self, LoginError};
use crate::auth::resolver::KeyResolver;

/// Login handshake endpoint. The body is the raw token wire string; a
/// successful handshake answers with the account record, or an empty body
/// when the identity has authenticated but never registered.
#[post("/login")]
pub async fn login(
    body: web::Bytes,
    config: web::Data<Config>,
    resolver: web::Data<Arc<dyn KeyResolver>>,
    sessions: web::Data<SessionRegistry>,
    accounts: web::Data<AccountRegistry>,
) -> impl Responder {
    let wire = match String::from_utf8(body.to_vec()) {
        Ok(wire) if !wire.is_empty() => wire,
        _ => return HttpResponse::BadRequest().finish(),
    };

    match handshake::login(
        &wire,
        resolver.get_ref().as_ref(),
        &config.auth,
        &sessions,
        &accounts,
    )
    .await
    {
        Ok(outcome) => match outcome.account {
            Some(record) => HttpResponse::Ok().json(record),
            // Authenticated, not yet registered
            None => HttpResponse::Ok().finish(),
        },
        Err(LoginError::Rejected(reason)) => {
            tracing::warn!("login rejected: {}", reason);
            match reason {
                AuthError::MalformedToken => HttpResponse::BadRequest().finish(),
                AuthError::TokenExpired
                | AuthError::InvalidSignature
                | AuthError::UnauthorizedKey => HttpResponse::Unauthorized().finish(),
                // Distinct status so the caller knows a retry may help
                AuthError::IdentityProviderUnavailable(_) => {
                    HttpResponse::ServiceUnavailable().finish()
                }
            }
        }
        Err(LoginError::Internal(e)) => internal_error("login", &e),
    }
}

/// Bind the authenticated identity to an account record, exactly once
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    body: web::Json<RegisterRequest>,
    sessions: web::Data<SessionRegistry>,
    accounts: web::Data<AccountRegistry>,
) -> impl Responder {
    let identity = match authorize(&req, &sessions).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let request = body.into_inner();
    match accounts
        .addr(&identity)
        .send(Register {
            display_name: request.display_name,
            external_wallet_id: Some(request.external_wallet_id),
        })
        .await
    {
        Ok(Ok(RegisterOutcome::Created(record))) => {
            tracing::info!("registered account for {}", identity);
            HttpResponse::Ok().json(record)
        }
        Ok(Ok(RegisterOutcome::AlreadyRegistered)) => HttpResponse::Conflict().finish(),
        Ok(Err(e)) => internal_error(&identity, &e),
        Err(e) => {
            tracing::error!("account mailbox for {}: {}", identity, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Current account record for the authenticated identity; empty body while
/// unregistered
#[get("/account")]
pub async fn account(
    req: HttpRequest,
    sessions: web::Data<SessionRegistry>,
    accounts: web::Data<AccountRegistry>,
) -> impl Responder {
    let identity = match authorize(&req, &sessions).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    match accounts.addr(&identity).send(GetAccount).await {
        Ok(Ok(Some(record))) => HttpResponse::Ok().json(record),
        Ok(Ok(None)) => HttpResponse::Ok().finish(),
        Ok(Err(e)) => internal_error(&identity, &e),
        Err(e) => {
            tracing::error!("account mailbox for {}: {}", identity, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
