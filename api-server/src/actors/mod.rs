// api-server/src/actors/mod.rs

pub mod account_actor;
pub mod content_actor;
pub mod keyed;
pub mod session_actor;
