// api-server/src/actors/content_actor.rs
use actix::{Actor, ActorFutureExt, AtomicResponse, Context, Handler, Message, WrapFuture};
use common::ActorError;
use std::sync::Arc;

use crate::storage::{Storage, COURSES};

/// Actor message: persist an uploaded course blob, replacing any prior one.
/// Format validation happens at the HTTP boundary before this message is
/// sent; the actor's only job is durability.
#[derive(Message)]
#[rtype(result = "Result<(), ActorError>")]
pub struct Upload {
    pub bytes: Vec<u8>,
}

/// Actor message: publish the stored course
#[derive(Message)]
#[rtype(result = "Result<PublishOutcome, ActorError>")]
pub struct Publish;

/// Publishing is declared in the protocol but not wired up yet; callers get
/// a stable not-implemented response rather than a fault.
#[derive(Debug, Clone, Copy)]
pub enum PublishOutcome {
    NotImplemented,
}

/// Content actor for one identity: owns that identity's uploaded course blob.
pub struct ContentActor {
    key: String,
    storage: Arc<dyn Storage>,
    /// `None` until the first operation checks durable storage; the inner
    /// bool records whether a blob exists for this identity.
    state: Option<bool>,
}

impl ContentActor {
    pub fn new(key: String, storage: Arc<dyn Storage>) -> Self {
        Self {
            key,
            storage,
            state: None,
        }
    }
}

async fn load_presence(storage: &dyn Storage, key: &str) -> Result<bool, ActorError> {
    storage
        .get(COURSES, key)
        .await
        .map(|blob| blob.is_some())
        .map_err(|e| ActorError::Initialization(e.to_string()))
}

impl Actor for ContentActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("content actor started: {}", self.key);
    }
}

impl Handler<Upload> for ContentActor {
    type Result = AtomicResponse<Self, Result<(), ActorError>>;

    fn handle(&mut self, msg: Upload, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage.clone();
        let key = self.key.clone();
        let cached = self.state;
        let size = msg.bytes.len();

        AtomicResponse::new(Box::pin(
            async move {
                if cached.is_none() {
                    load_presence(storage.as_ref(), &key).await?;
                }
                // Write through before acknowledging; replaces any prior blob
                storage.put(COURSES, &key, msg.bytes).await?;
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), ActorError>, act, _ctx| match res {
                Ok(()) => {
                    act.state = Some(true);
                    tracing::info!("stored course blob for {} ({} bytes)", act.key, size);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("content actor {}: upload failed: {}", act.key, e);
                    Err(e)
                }
            }),
        ))
    }
}

impl Handler<Publish> for ContentActor {
    type Result = AtomicResponse<Self, Result<PublishOutcome, ActorError>>;

    fn handle(&mut self, _msg: Publish, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage.clone();
        let key = self.key.clone();
        let cached = self.state;

        AtomicResponse::new(Box::pin(
            async move {
                let present = match cached {
                    Some(present) => present,
                    None => load_presence(storage.as_ref(), &key).await?,
                };
                Ok((present, PublishOutcome::NotImplemented))
            }
            .into_actor(self)
            .map(
                |res: Result<(bool, PublishOutcome), ActorError>, act, _ctx| match res {
                    Ok((present, outcome)) => {
                        act.state = Some(present);
                        Ok(outcome)
                    }
                    Err(e) => {
                        tracing::error!("content actor {}: publish failed: {}", act.key, e);
                        Err(e)
                    }
                },
            ),
        ))
    }
}
