//! contrast-server - HTTP surface for the comparison engine
//!
//! One POST endpoint implementing the public wire contract, a status
//! endpoint, and permissive CORS for browser clients.

pub mod server;

pub use server::{ApiServer, AppState};
