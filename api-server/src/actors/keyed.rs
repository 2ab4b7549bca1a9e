// api-server/src/actors/keyed.rs
use actix::{Actor, Addr, Context};
use dashmap::DashMap;

/// Per-key actor registry.
///
/// Keyed actors serialize all operations for one key through a single actix
/// mailbox; the registry's job is to guarantee that at most one live actor
/// exists per key, so that mailbox really is the only way to touch the key's
/// state. DashMap's entry API holds the shard lock across the insert, which
/// rules out two concurrent lookups starting duplicate actors.
///
/// Actors start lazily: nothing is spawned for a key until the first lookup,
/// and the actor itself defers loading durable state until its first message.
pub struct Registry<A>
where
    A: Actor<Context = Context<A>>,
{
    actors: DashMap<String, Addr<A>>,
    spawn: Box<dyn Fn(String) -> A + Send + Sync>,
}

impl<A> Registry<A>
where
    A: Actor<Context = Context<A>>,
{
    /// `spawn` constructs the actor for a key; it is called at most once per
    /// key for the lifetime of the registry.
    pub fn new<F>(spawn: F) -> Self
    where
        F: Fn(String) -> A + Send + Sync + 'static,
    {
        Self {
            actors: DashMap::new(),
            spawn: Box::new(spawn),
        }
    }

    /// Address of the actor owning `key`, starting it on first use.
    pub fn addr(&self, key: &str) -> Addr<A> {
        self.actors
            .entry(key.to_owned())
            .or_insert_with(|| {
                tracing::debug!("starting keyed actor for {}", key);
                (self.spawn)(key.to_owned()).start()
            })
            .value()
            .clone()
    }

    /// Number of live actors, used for diagnostics
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
