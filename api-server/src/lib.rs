// api-server/src/lib.rs
pub mod actors;
pub mod api;
pub mod auth;
pub mod course;
pub mod storage;
