//! Rust client SDK for the Cloudbox hosted sandbox service.
//!
//! A [`Cloudbox`] client creates [`Session`] handles addressing remote
//! sandboxed execution environments. Sessions run commands, access files, and
//! can be checkpointed: [`Session::dump_state`] serializes a handle's
//! identifying and connection-cache state into portable snapshot text, and
//! [`Session::restore_state`] rebuilds an equivalent handle in any process
//! without a service round trip.

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;

pub use client::{Cloudbox, CreateSessionParams, DeleteResult, SessionResult};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{
	Agent, Command, CommandOutput, FileSystem, SESSION_STATE_SCHEMA_VERSION, Session, SessionState, TaskOutcome,
	TaskQuery, TaskStarted, TaskStatus,
};
pub use transport::{HttpTransport, Transport};
