//! Session state dump and restore.
//!
//! Snapshots are self-contained, versioned JSON records that let a session
//! handle be rebuilt in another process without a service round trip. The
//! cached VPC link URL is carried along so a restored handle keeps serving it
//! locally instead of re-deriving it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Session;
use crate::client::Cloudbox;
use crate::error::{Error, Result};
use crate::transport::check;
use cloudbox_protocol::session::GetSessionRequest;

/// Current snapshot schema version.
pub const SESSION_STATE_SCHEMA_VERSION: u32 = 1;

fn session_state_schema_version() -> u32 {
	SESSION_STATE_SCHEMA_VERSION
}

/// Portable encoding of a [`Session`]'s identifying and connection-cache
/// state.
///
/// Keys are order-insensitive; unknown keys are ignored for forward
/// compatibility and missing optional keys decode to absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
	/// Snapshot schema version, defaults to current when absent.
	#[serde(default = "session_state_schema_version")]
	pub schema_version: u32,
	pub session_id: String,
	pub is_vpc_enabled: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub http_port: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_transfer_context_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vpc_link_url: Option<String>,
}

impl SessionState {
	/// Parses snapshot text, rejecting malformed or future-versioned records.
	pub fn decode(text: &str) -> Result<Self> {
		let state: SessionState = serde_json::from_str(text).map_err(|err| Error::Decode(err.to_string()))?;
		if state.schema_version > SESSION_STATE_SCHEMA_VERSION {
			return Err(Error::Decode(format!(
				"unsupported snapshot schema_version {} (newest known is {SESSION_STATE_SCHEMA_VERSION})",
				state.schema_version
			)));
		}
		if state.session_id.is_empty() {
			return Err(Error::Decode("snapshot session_id is empty".into()));
		}
		Ok(state)
	}

	pub fn encode(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}
}

impl Session {
	/// Serializes this handle's state into portable snapshot text.
	///
	/// Pure read; the handle stays fully usable. Fails with
	/// [`Error::InvalidState`] on a handle that was never fully created.
	pub fn dump_state(&self) -> Result<String> {
		if self.session_id().is_empty() {
			return Err(Error::InvalidState("cannot dump a session without a session id".into()));
		}
		let state = SessionState {
			schema_version: SESSION_STATE_SCHEMA_VERSION,
			session_id: self.session_id().to_string(),
			is_vpc_enabled: self.is_vpc_enabled(),
			http_port: self.http_port().map(str::to_string),
			file_transfer_context_id: self.file_transfer_context_id(),
			vpc_link_url: self.cached_link().map(str::to_string),
		};
		state.encode()
	}

	/// Rebuilds a session handle from snapshot text, attached to `client`.
	///
	/// Purely local: no service call is made, and a cached VPC link URL in
	/// the snapshot is reused rather than re-derived. Either a fully valid
	/// handle is returned or an error; there is no partial state. Use
	/// [`Session::restore_state_verified`] to also confirm the session is
	/// still live server-side.
	pub fn restore_state(client: &Cloudbox, snapshot: &str) -> Result<Session> {
		let state = SessionState::decode(snapshot)?;
		if state.is_vpc_enabled && state.http_port.is_none() {
			// Port allocation may post-date the snapshot; not fatal.
			warn!(target = "cloudbox.state", session_id = %state.session_id, "restoring VPC session without an http port");
		}

		let session = Session::attach(
			client.inner().clone(),
			state.session_id.clone(),
			state.is_vpc_enabled,
			state.http_port,
			state.file_transfer_context_id,
			state.vpc_link_url,
		);
		client.inner().register(session.clone());
		debug!(target = "cloudbox.state", session_id = %state.session_id, "session restored from snapshot");
		Ok(session)
	}

	/// Restores a handle, then verifies the session exists server-side.
	///
	/// The verification round trip is the only remote call; a missing or
	/// failed session surfaces as [`Error::Remote`].
	pub async fn restore_state_verified(client: &Cloudbox, snapshot: &str) -> Result<Session> {
		let session = Session::restore_state(client, snapshot)?;
		let request = GetSessionRequest {
			session_id: session.session_id().to_string(),
		};
		let envelope = client.inner().transport.get_session(request).await?;
		let envelope = check("GetSession", envelope)?;
		if envelope.data.is_none() {
			return Err(Error::remote("GetSession", format!("session {} not found", session.session_id())));
		}
		Ok(session)
	}
}
