//! Tapewire client.
//!
//! Connects to a Tapewire server, sends payloads into the shared slot, reads
//! it back, and recognises rule programs among the server's replies so they
//! can be loaded into a local [`tapewire_core::TapeMachine`].
//!
//! # Components
//!
//! - [`ClientEngine`]: one TCP connection plus its receive task
//! - [`ClientEvent`]: status changes, server lines, received rule programs
//! - [`ClientConfig`]: connect timeout and line limit

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod engine;
mod error;
mod event;

pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use engine::ClientEngine;
pub use error::ClientError;
pub use event::{ClientEvent, ConnectionState};
