//! Session handles and their thin RPC wrappers.

mod agent;
mod command;
mod filesystem;
mod state;

pub use agent::{Agent, TaskOutcome, TaskQuery, TaskStarted, TaskStatus};
pub use command::{Command, CommandOutput};
pub use filesystem::FileSystem;
pub use state::{SESSION_STATE_SCHEMA_VERSION, SessionState};

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use cloudbox_protocol::label::{GetLabelRequest, SetLabelRequest};
use cloudbox_protocol::session::{GetLinkRequest, ReleaseSessionRequest};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::client::{ClientInner, DeleteResult};
use crate::error::{Error, Result};
use crate::transport::check;

pub(crate) struct SessionInner {
	pub(crate) client: Arc<ClientInner>,
	pub(crate) session_id: String,
	pub(crate) is_vpc_enabled: bool,
	pub(crate) http_port: Option<String>,
	pub(crate) file_transfer_context_id: RwLock<Option<String>>,
	/// First-use-wins cache for the VPC reachability URL.
	pub(crate) vpc_link_url: OnceLock<String>,
}

/// Client-side handle to a remote sandbox session.
///
/// Cheap to clone; clones share all state, including the link cache. The
/// handle keeps a non-owning back-reference to the client that created or
/// restored it, which is what lets it issue further remote calls.
#[derive(Clone)]
pub struct Session {
	inner: Arc<SessionInner>,
}

impl Session {
	pub(crate) fn attach(
		client: Arc<ClientInner>,
		session_id: String,
		is_vpc_enabled: bool,
		http_port: Option<String>,
		file_transfer_context_id: Option<String>,
		vpc_link_url: Option<String>,
	) -> Self {
		let cache = OnceLock::new();
		if let Some(url) = vpc_link_url {
			let _ = cache.set(url);
		}
		Self {
			inner: Arc::new(SessionInner {
				client,
				session_id,
				is_vpc_enabled,
				http_port,
				file_transfer_context_id: RwLock::new(file_transfer_context_id),
				vpc_link_url: cache,
			}),
		}
	}

	/// Opaque id assigned by the service at creation; immutable.
	pub fn session_id(&self) -> &str {
		&self.inner.session_id
	}

	/// Whether traffic is routed through a private network link.
	pub fn is_vpc_enabled(&self) -> bool {
		self.inner.is_vpc_enabled
	}

	/// Port the private link proxies traffic through, when allocated.
	pub fn http_port(&self) -> Option<&str> {
		self.inner.http_port.as_deref()
	}

	/// Id of the persistent file-sync context linked to this session.
	pub fn file_transfer_context_id(&self) -> Option<String> {
		self.inner.file_transfer_context_id.read().clone()
	}

	pub fn set_file_transfer_context_id(&self, context_id: Option<String>) {
		*self.inner.file_transfer_context_id.write() = context_id;
	}

	/// Cached reachability URL, if one has been fetched or restored.
	pub fn cached_link(&self) -> Option<&str> {
		self.inner.vpc_link_url.get().map(String::as_str)
	}

	/// Returns the session's reachability URL, fetching it at most once.
	pub async fn link(&self) -> Result<String> {
		if let Some(url) = self.inner.vpc_link_url.get() {
			debug!(target = "cloudbox.session", session_id = %self.inner.session_id, "link served from cache");
			return Ok(url.clone());
		}

		let request = GetLinkRequest {
			session_id: self.inner.session_id.clone(),
			protocol_type: None,
			port: None,
		};
		let envelope = self.inner.client.transport.get_link(request).await?;
		let envelope = check("GetLink", envelope)?;
		let url = envelope
			.data
			.and_then(|data| data.url)
			.filter(|url| !url.is_empty())
			.ok_or_else(|| Error::remote("GetLink", "response carried no url"))?;

		// A concurrent clone may have set it first; the value is the same.
		Ok(self.inner.vpc_link_url.get_or_init(|| url).clone())
	}

	/// Command execution on the remote sandbox.
	pub fn command(&self) -> Command {
		Command::new(self.inner.clone())
	}

	/// File access on the remote sandbox.
	pub fn file_system(&self) -> FileSystem {
		FileSystem::new(self.inner.clone())
	}

	/// Natural-language task execution via the sandbox agent.
	pub fn agent(&self) -> Agent {
		Agent::new(self.inner.clone())
	}

	/// Replaces the session's labels.
	pub async fn set_labels(&self, labels: &HashMap<String, String>) -> Result<()> {
		let request = SetLabelRequest {
			session_id: self.inner.session_id.clone(),
			labels: serde_json::to_string(labels)?,
		};
		let envelope = self.inner.client.transport.set_labels(request).await?;
		check("SetLabel", envelope)?;
		Ok(())
	}

	/// Fetches the session's labels.
	pub async fn get_labels(&self) -> Result<HashMap<String, String>> {
		let request = GetLabelRequest {
			session_id: self.inner.session_id.clone(),
		};
		let envelope = self.inner.client.transport.get_labels(request).await?;
		let envelope = check("GetLabel", envelope)?;
		match envelope.data.and_then(|data| data.labels) {
			Some(text) => serde_json::from_str(&text).map_err(|err| Error::remote("GetLabel", err.to_string())),
			None => Ok(HashMap::new()),
		}
	}

	/// Releases the remote session. Terminal; the handle is unusable after.
	pub async fn delete(&self, sync_context: bool) -> Result<DeleteResult> {
		let request = ReleaseSessionRequest {
			session_id: self.inner.session_id.clone(),
			sync_context: sync_context.then_some(true),
		};
		let envelope = self.inner.client.transport.release_session(request).await?;
		let request_id = envelope.request_id();
		check("ReleaseSession", envelope)?;
		info!(target = "cloudbox.session", session_id = %self.inner.session_id, "session released");
		Ok(DeleteResult { request_id })
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("session_id", &self.inner.session_id)
			.field("is_vpc_enabled", &self.inner.is_vpc_enabled)
			.field("http_port", &self.inner.http_port)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::client::Cloudbox;
	use crate::config::Config;
	use crate::transport::testing::StubTransport;

	fn client_with(stub: StubTransport) -> Cloudbox {
		Cloudbox::with_transport(Config::default(), Arc::new(stub))
	}

	fn session_on(client: &Cloudbox, session_id: &str, vpc: bool) -> Session {
		Session::attach(client.inner().clone(), session_id.to_string(), vpc, None, None, None)
	}

	#[tokio::test]
	async fn link_is_fetched_once_and_cached() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.link_url = Some("https://link.example/sess-1".to_string());
		let stub = Arc::new(stub);
		let client = Cloudbox::with_transport(Config::default(), stub.clone());
		let session = session_on(&client, "sess-1", true);

		assert!(session.cached_link().is_none());
		let first = session.link().await.unwrap();
		let second = session.link().await.unwrap();

		assert_eq!(first, "https://link.example/sess-1");
		assert_eq!(first, second);
		assert_eq!(stub.link_calls(), 1);
		assert_eq!(session.cached_link(), Some("https://link.example/sess-1"));
	}

	#[tokio::test]
	async fn link_without_url_in_response_is_remote_error() {
		let client = client_with(StubTransport::with_session("sess-1"));
		let session = session_on(&client, "sess-1", true);

		let err = session.link().await.unwrap_err();
		assert!(matches!(err, Error::Remote { operation: "GetLink", .. }));
	}

	#[tokio::test]
	async fn clones_share_the_link_cache() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.link_url = Some("https://link.example/sess-1".to_string());
		let stub = Arc::new(stub);
		let client = Cloudbox::with_transport(Config::default(), stub.clone());
		let session = session_on(&client, "sess-1", true);
		let clone = session.clone();

		session.link().await.unwrap();
		clone.link().await.unwrap();
		assert_eq!(stub.link_calls(), 1);
	}

	#[test]
	fn file_transfer_context_id_is_settable() {
		let client = client_with(StubTransport::with_session("sess-1"));
		let session = session_on(&client, "sess-1", false);

		assert!(session.file_transfer_context_id().is_none());
		session.set_file_transfer_context_id(Some("ctx-9".to_string()));
		assert_eq!(session.file_transfer_context_id().as_deref(), Some("ctx-9"));
	}

	#[tokio::test]
	async fn labels_round_trip_through_json_strings() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.labels = Some(r#"{"team":"infra"}"#.to_string());
		let client = client_with(stub);
		let session = session_on(&client, "sess-1", false);

		let labels = session.get_labels().await.unwrap();
		assert_eq!(labels.get("team").map(String::as_str), Some("infra"));
	}
}
