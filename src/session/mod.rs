//! Session management - room assignment and lookup

pub mod manager;

pub use manager::SessionManager;
