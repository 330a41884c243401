//! Session loop for the command channel
//!
//! This module owns the transport and the command engine: it feeds every
//! received datagram to the engine, routes the response back to the sender
//! and stops the process when a shutdown is commanded.

mod manager;

pub use manager::{SessionConfig, SessionManager};
