// api-server/src/actors/session_actor.rs
use actix::{Actor, ActorFutureExt, AtomicResponse, Context, Handler, Message, WrapFuture};
use common::ActorError;
use std::sync::Arc;

use crate::storage::{Storage, SESSIONS};

/// Actor message: overwrite the stored access token for this identity
#[derive(Message)]
#[rtype(result = "Result<(), ActorError>")]
pub struct SetToken {
    pub token: String,
}

/// Actor message: does the candidate token match the stored one exactly?
#[derive(Message)]
#[rtype(result = "Result<bool, ActorError>")]
pub struct IsValid {
    pub token: String,
}

/// Session actor for one identity: holds the current access token.
///
/// Messages are processed one at a time through `AtomicResponse`, so the
/// load-mutate-persist sequence of one operation never interleaves with
/// another operation on the same identity.
pub struct SessionActor {
    key: String,
    storage: Arc<dyn Storage>,
    /// `None` until the first operation loads durable state; the inner
    /// `Option` is the token itself (a fresh identity has none). A failed
    /// load leaves this `None` so the next operation retries.
    state: Option<Option<String>>,
}

impl SessionActor {
    pub fn new(key: String, storage: Arc<dyn Storage>) -> Self {
        Self {
            key,
            storage,
            state: None,
        }
    }
}

async fn load_token(storage: &dyn Storage, key: &str) -> Result<Option<String>, ActorError> {
    let raw = storage
        .get(SESSIONS, key)
        .await
        .map_err(|e| ActorError::Initialization(e.to_string()))?;
    match raw {
        None => Ok(None),
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| ActorError::Initialization(format!("corrupt session record: {}", e))),
    }
}

impl Actor for SessionActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("session actor started: {}", self.key);
    }
}

impl Handler<SetToken> for SessionActor {
    type Result = AtomicResponse<Self, Result<(), ActorError>>;

    fn handle(&mut self, msg: SetToken, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage.clone();
        let key = self.key.clone();
        let cached = self.state.clone();

        AtomicResponse::new(Box::pin(
            async move {
                // First operation on a fresh instance initializes from
                // durable storage before anything else runs.
                if cached.is_none() {
                    load_token(storage.as_ref(), &key).await?;
                }
                // Write through before acknowledging
                storage
                    .put(SESSIONS, &key, msg.token.clone().into_bytes())
                    .await?;
                Ok(msg.token)
            }
            .into_actor(self)
            .map(|res: Result<String, ActorError>, act, _ctx| match res {
                Ok(token) => {
                    act.state = Some(Some(token));
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("session actor {}: set token failed: {}", act.key, e);
                    Err(e)
                }
            }),
        ))
    }
}

impl Handler<IsValid> for SessionActor {
    type Result = AtomicResponse<Self, Result<bool, ActorError>>;

    fn handle(&mut self, msg: IsValid, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage.clone();
        let key = self.key.clone();
        let cached = self.state.clone();

        AtomicResponse::new(Box::pin(
            async move {
                let current = match cached {
                    Some(current) => current,
                    None => load_token(storage.as_ref(), &key).await?,
                };
                // No stored token is a benign negative, not an error
                let valid = current.as_deref() == Some(msg.token.as_str());
                Ok((current, valid))
            }
            .into_actor(self)
            .map(
                |res: Result<(Option<String>, bool), ActorError>, act, _ctx| match res {
                    Ok((current, valid)) => {
                        act.state = Some(current);
                        Ok(valid)
                    }
                    Err(e) => {
                        tracing::error!("session actor {}: validity check failed: {}", act.key, e);
                        Err(e)
                    }
                },
            ),
        ))
    }
}
