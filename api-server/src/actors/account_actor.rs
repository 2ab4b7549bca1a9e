// api-server/src/actors/account_actor.rs
use actix::{Actor, ActorFutureExt, AtomicResponse, Context, Handler, Message, WrapFuture};
use common::models::Account;
use common::ActorError;
use std::sync::Arc;

use crate::storage::{Storage, ACCOUNTS};

/// Actor message: fetch the registered account record, if any
#[derive(Message)]
#[rtype(result = "Result<Option<Account>, ActorError>")]
pub struct GetAccount;

/// Actor message: bind this identity to an account record
#[derive(Message)]
#[rtype(result = "Result<RegisterOutcome, ActorError>")]
pub struct Register {
    pub display_name: String,
    pub external_wallet_id: Option<String>,
}

/// Registration result. `AlreadyRegistered` is a rejection, not a fault: the
/// existing record is left untouched and the caller gets a conflict status.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    Created(Account),
    AlreadyRegistered,
}

/// Account actor for one identity.
///
/// Mailbox ordering makes `Register`'s check-then-write atomic: no other
/// operation on this identity can run between the existence check and the
/// persist, so at most one registration ever succeeds.
pub struct AccountActor {
    key: String,
    storage: Arc<dyn Storage>,
    /// `None` until the first operation loads durable state; the inner
    /// `Option` is the registered record (absent for a new identity).
    state: Option<Option<Account>>,
}

impl AccountActor {
    pub fn new(key: String, storage: Arc<dyn Storage>) -> Self {
        Self {
            key,
            storage,
            state: None,
        }
    }
}

async fn load_account(storage: &dyn Storage, key: &str) -> Result<Option<Account>, ActorError> {
    let raw = storage
        .get(ACCOUNTS, key)
        .await
        .map_err(|e| ActorError::Initialization(e.to_string()))?;
    match raw {
        None => Ok(None),
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ActorError::Initialization(format!("corrupt account record: {}", e))),
    }
}

impl Actor for AccountActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("account actor started: {}", self.key);
    }
}

impl Handler<GetAccount> for AccountActor {
    type Result = AtomicResponse<Self, Result<Option<Account>, ActorError>>;

    fn handle(&mut self, _msg: GetAccount, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage.clone();
        let key = self.key.clone();
        let cached = self.state.clone();

        AtomicResponse::new(Box::pin(
            async move {
                match cached {
                    Some(current) => Ok(current),
                    None => load_account(storage.as_ref(), &key).await,
                }
            }
            .into_actor(self)
            .map(
                |res: Result<Option<Account>, ActorError>, act, _ctx| match res {
                    Ok(current) => {
                        act.state = Some(current.clone());
                        Ok(current)
                    }
                    Err(e) => {
                        tracing::error!("account actor {}: lookup failed: {}", act.key, e);
                        Err(e)
                    }
                },
            ),
        ))
    }
}

impl Handler<Register> for AccountActor {
    type Result = AtomicResponse<Self, Result<RegisterOutcome, ActorError>>;

    fn handle(&mut self, msg: Register, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage.clone();
        let key = self.key.clone();
        let cached = self.state.clone();

        AtomicResponse::new(Box::pin(
            async move {
                let current = match cached {
                    Some(current) => current,
                    None => load_account(storage.as_ref(), &key).await?,
                };
                match current {
                    Some(existing) => {
                        // Never overwrite: first registration wins
                        Ok((Some(existing), RegisterOutcome::AlreadyRegistered))
                    }
                    None => {
                        let account =
                            Account::new(key.clone(), msg.display_name, msg.external_wallet_id);
                        let bytes = serde_json::to_vec(&account)
                            .map_err(|e| ActorError::Storage(e.to_string()))?;
                        // Write through before acknowledging
                        storage.put(ACCOUNTS, &key, bytes).await?;
                        Ok((
                            Some(account.clone()),
                            RegisterOutcome::Created(account),
                        ))
                    }
                }
            }
            .into_actor(self)
            .map(
                |res: Result<(Option<Account>, RegisterOutcome), ActorError>, act, _ctx| match res {
                    Ok((state, outcome)) => {
                        act.state = Some(state);
                        if matches!(outcome, RegisterOutcome::AlreadyRegistered) {
                            tracing::warn!(
                                "account actor {}: rejected duplicate registration",
                                act.key
                            );
                        }
                        Ok(outcome)
                    }
                    Err(e) => {
                        tracing::error!("account actor {}: registration failed: {}", act.key, e);
                        Err(e)
                    }
                },
            ),
        ))
    }
}
