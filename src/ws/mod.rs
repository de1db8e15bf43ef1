//! WebSocket gateway

pub mod clients;
pub mod handler;
pub mod protocol;

pub use clients::ClientRegistry;
