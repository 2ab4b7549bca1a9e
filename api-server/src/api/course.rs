// api-server/src/api/course.rs
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};

use super::{authorize, internal_error, ContentRegistry, SessionRegistry};
use crate::actors::content_actor::{Publish, PublishOutcome, Upload};
use crate::course;

/// Validate a course file without storing it
#[post("/check")]
pub async fn check(body: web::Bytes) -> impl Responder {
    if course::is_course(&body) {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::BadRequest().finish()
    }
}

/// Store a course file for the authenticated identity, replacing any prior
/// upload
#[post("/upload")]
pub async fn upload(
    req: HttpRequest,
    body: web::Bytes,
    sessions: web::Data<SessionRegistry>,
    contents: web::Data<ContentRegistry>,
) -> impl Responder {
    let identity = match authorize(&req, &sessions).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    // Format gate sits at the boundary; the actor only persists
    if !course::is_course(&body) {
        tracing::warn!("rejected malformed course upload from {}", identity);
        return HttpResponse::BadRequest().finish();
    }

    match contents
        .addr(&identity)
        .send(Upload {
            bytes: body.to_vec(),
        })
        .await
    {
        Ok(Ok(())) => HttpResponse::NoContent().finish(),
        Ok(Err(e)) => internal_error(&identity, &e),
        Err(e) => {
            tracing::error!("content mailbox for {}: {}", identity, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/publish")]
pub async fn publish(
    req: HttpRequest,
    sessions: web::Data<SessionRegistry>,
    contents: web::Data<ContentRegistry>,
) -> impl Responder {
    let identity = match authorize(&req, &sessions).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    match contents.addr(&identity).send(Publish).await {
        Ok(Ok(PublishOutcome::NotImplemented)) => HttpResponse::NotImplemented().finish(),
        Ok(Err(e)) => internal_error(&identity, &e),
        Err(e) => {
            tracing::error!("content mailbox for {}: {}", identity, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
