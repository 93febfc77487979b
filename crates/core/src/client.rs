//! Client handle for the hosted sandbox service.

use std::collections::HashMap;
use std::sync::Arc;

use cloudbox_protocol::session::{CreateSessionRequest, GetSessionRequest};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::config::{Config, resolve_api_key};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport, check};

/// Parameters for creating a session.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionParams {
	/// Sandbox image to boot; service default when unset.
	pub image_id: Option<String>,
	/// Labels attached to the session at creation.
	pub labels: HashMap<String, String>,
	/// Route traffic through a private network link.
	pub is_vpc: bool,
	/// Persistent context to mount into the session.
	pub context_id: Option<String>,
}

impl CreateSessionParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
		self.image_id = Some(image_id.into());
		self
	}

	pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.labels.insert(key.into(), value.into());
		self
	}

	pub fn with_is_vpc(mut self, is_vpc: bool) -> Self {
		self.is_vpc = is_vpc;
		self
	}

	pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
		self.context_id = Some(context_id.into());
		self
	}
}

/// Result of a session create or lookup call.
#[derive(Debug, Clone)]
pub struct SessionResult {
	/// Service request id for correlation.
	pub request_id: String,
	pub session: Session,
}

/// Result of a session delete call.
#[derive(Debug, Clone)]
pub struct DeleteResult {
	pub request_id: String,
}

pub(crate) struct ClientInner {
	pub(crate) transport: Arc<dyn Transport>,
	pub(crate) config: Config,
	sessions: DashMap<String, Session>,
}

impl ClientInner {
	/// Registers a session handle; idempotent by session id.
	pub(crate) fn register(&self, session: Session) {
		self.sessions.insert(session.session_id().to_string(), session);
	}

	pub(crate) fn unregister(&self, session_id: &str) {
		self.sessions.remove(session_id);
	}
}

/// Handle to the hosted sandbox service.
///
/// Cheap to clone; all clones share one transport and one session registry.
/// Many [`Session`] handles may reference the same client concurrently.
#[derive(Clone)]
pub struct Cloudbox {
	inner: Arc<ClientInner>,
}

impl Cloudbox {
	/// Builds a client with config resolved from the environment.
	///
	/// An empty `api_key` falls back to `CLOUDBOX_API_KEY`.
	pub fn new(api_key: &str) -> Result<Self> {
		Self::with_config(api_key, None)
	}

	pub fn with_config(api_key: &str, config: Option<Config>) -> Result<Self> {
		let api_key = resolve_api_key(api_key)?;
		let config = Config::load(config);
		let transport = Arc::new(HttpTransport::new(api_key, &config)?);
		Ok(Self::with_transport(config, transport))
	}

	/// Builds a client over an explicit transport.
	pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
		Self {
			inner: Arc::new(ClientInner {
				transport,
				config,
				sessions: DashMap::new(),
			}),
		}
	}

	pub fn config(&self) -> &Config {
		&self.inner.config
	}

	/// Creates a new remote session.
	pub async fn create(&self, params: CreateSessionParams) -> Result<SessionResult> {
		let labels = if params.labels.is_empty() {
			None
		} else {
			Some(serde_json::to_string(&params.labels)?)
		};
		let request = CreateSessionRequest {
			image_id: params.image_id,
			labels,
			context_id: params.context_id,
			vpc_resource: params.is_vpc.then_some(true),
		};

		let envelope = self.inner.transport.create_session(request).await?;
		let request_id = envelope.request_id();
		let envelope = check("CreateSession", envelope)?;
		let data = envelope
			.data
			.ok_or_else(|| Error::remote("CreateSession", "response carried no data"))?;
		let session_id = data
			.session_id
			.filter(|id| !id.is_empty())
			.ok_or_else(|| Error::remote("CreateSession", "response carried no session id"))?;

		info!(target = "cloudbox.client", session_id = %session_id, vpc = params.is_vpc, "session created");
		let session = Session::attach(self.inner.clone(), session_id, params.is_vpc, data.http_port, None, None);
		self.inner.register(session.clone());
		Ok(SessionResult { request_id, session })
	}

	/// Fetches a session by id from the service and attaches a handle to it.
	pub async fn get(&self, session_id: &str) -> Result<SessionResult> {
		if session_id.trim().is_empty() {
			return Err(Error::InvalidState("session id must not be empty".into()));
		}

		let request = GetSessionRequest {
			session_id: session_id.to_string(),
		};
		let envelope = self.inner.transport.get_session(request).await?;
		let request_id = envelope.request_id();
		let envelope = check("GetSession", envelope)?;
		let data = envelope
			.data
			.ok_or_else(|| Error::remote("GetSession", "response carried no data"))?;

		let is_vpc = data.vpc_resource.unwrap_or(false);
		debug!(target = "cloudbox.client", session_id, vpc = is_vpc, "session fetched");
		let session = Session::attach(self.inner.clone(), session_id.to_string(), is_vpc, data.http_port, None, None);
		self.inner.register(session.clone());
		Ok(SessionResult { request_id, session })
	}

	/// Local registry lookup; no remote call.
	pub fn find(&self, session_id: &str) -> Option<Session> {
		self.inner.sessions.get(session_id).map(|entry| entry.value().clone())
	}

	/// All sessions known to this client instance.
	pub fn list(&self) -> Vec<Session> {
		self.inner.sessions.iter().map(|entry| entry.value().clone()).collect()
	}

	/// Deletes a remote session and drops it from the registry.
	pub async fn delete(&self, session: &Session, sync_context: bool) -> Result<DeleteResult> {
		let result = session.delete(sync_context).await?;
		self.inner.unregister(session.session_id());
		Ok(result)
	}

	/// Reconstructs a session handle from snapshot text.
	///
	/// Purely local; see [`Session::restore_state`].
	pub fn restore(&self, snapshot: &str) -> Result<Session> {
		Session::restore_state(self, snapshot)
	}

	/// Restores a handle, then confirms the session is still live server-side.
	pub async fn restore_verified(&self, snapshot: &str) -> Result<Session> {
		Session::restore_state_verified(self, snapshot).await
	}

	pub(crate) fn inner(&self) -> &Arc<ClientInner> {
		&self.inner
	}
}
