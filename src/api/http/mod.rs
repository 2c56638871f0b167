// src/api/http/mod.rs

pub mod chat;
pub mod router;

pub use router::http_router;
