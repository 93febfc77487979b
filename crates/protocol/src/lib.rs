//! Wire types for the Cloudbox session service.
//!
//! Request and response shapes only; the transport that carries them lives in
//! the core crate. Field names follow the service's PascalCase JSON
//! convention.

pub mod envelope;
pub mod label;
pub mod session;
pub mod tool;

pub use envelope::ResponseEnvelope;
