// api-server/src/auth/mod.rs

pub mod handshake;
pub mod resolver;
pub mod token;
pub mod verify;
