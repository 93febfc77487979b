//! Transport seam between the SDK and the hosted service.
//!
//! [`Transport`] is the typed RPC surface; [`HttpTransport`] is the one real
//! implementation. Tests substitute recording doubles to observe which remote
//! calls a code path makes.

use std::time::Duration;

use async_trait::async_trait;
use cloudbox_protocol::envelope::ResponseEnvelope;
use cloudbox_protocol::label::{GetLabelData, GetLabelRequest, SetLabelRequest};
use cloudbox_protocol::session::{
	CreateSessionData, CreateSessionRequest, GetLinkData, GetLinkRequest, GetSessionData, GetSessionRequest,
	ReleaseSessionRequest,
};
use cloudbox_protocol::tool::{CallToolData, CallToolRequest};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Typed RPC surface of the hosted service.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn create_session(&self, req: CreateSessionRequest) -> Result<ResponseEnvelope<CreateSessionData>>;
	async fn get_session(&self, req: GetSessionRequest) -> Result<ResponseEnvelope<GetSessionData>>;
	async fn release_session(&self, req: ReleaseSessionRequest) -> Result<ResponseEnvelope<serde_json::Value>>;
	async fn get_link(&self, req: GetLinkRequest) -> Result<ResponseEnvelope<GetLinkData>>;
	async fn call_tool(&self, req: CallToolRequest) -> Result<ResponseEnvelope<CallToolData>>;
	async fn set_labels(&self, req: SetLabelRequest) -> Result<ResponseEnvelope<serde_json::Value>>;
	async fn get_labels(&self, req: GetLabelRequest) -> Result<ResponseEnvelope<GetLabelData>>;
}

/// Maps an explicit service-side failure into [`Error::Remote`].
pub(crate) fn check<T>(operation: &'static str, envelope: ResponseEnvelope<T>) -> Result<ResponseEnvelope<T>> {
	if envelope.succeeded() {
		return Ok(envelope);
	}
	let message = envelope
		.message
		.clone()
		.or_else(|| envelope.code.clone())
		.unwrap_or_else(|| "service reported failure".to_string());
	Err(Error::remote(operation, message))
}

/// HTTP transport posting JSON operations to the configured endpoint.
pub struct HttpTransport {
	client: reqwest::Client,
	base_url: String,
	api_key: String,
}

impl HttpTransport {
	pub fn new(api_key: String, config: &Config) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_millis(config.timeout_ms))
			.build()?;
		Ok(Self {
			client,
			base_url: config.base_url(),
			api_key,
		})
	}

	async fn post<Req, Data>(&self, operation: &'static str, req: &Req) -> Result<ResponseEnvelope<Data>>
	where
		Req: Serialize + Sync,
		Data: DeserializeOwned,
	{
		let url = format!("{}/api/{operation}", self.base_url);
		debug!(target = "cloudbox.transport", %url, "sending request");

		let response = self.client.post(&url).bearer_auth(&self.api_key).json(req).send().await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(Error::remote(operation, format!("unexpected status {status}: {body}")));
		}

		Ok(response.json().await?)
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn create_session(&self, req: CreateSessionRequest) -> Result<ResponseEnvelope<CreateSessionData>> {
		self.post("CreateSession", &req).await
	}

	async fn get_session(&self, req: GetSessionRequest) -> Result<ResponseEnvelope<GetSessionData>> {
		self.post("GetSession", &req).await
	}

	async fn release_session(&self, req: ReleaseSessionRequest) -> Result<ResponseEnvelope<serde_json::Value>> {
		self.post("ReleaseSession", &req).await
	}

	async fn get_link(&self, req: GetLinkRequest) -> Result<ResponseEnvelope<GetLinkData>> {
		self.post("GetLink", &req).await
	}

	async fn call_tool(&self, req: CallToolRequest) -> Result<ResponseEnvelope<CallToolData>> {
		self.post("CallTool", &req).await
	}

	async fn set_labels(&self, req: SetLabelRequest) -> Result<ResponseEnvelope<serde_json::Value>> {
		self.post("SetLabel", &req).await
	}

	async fn get_labels(&self, req: GetLabelRequest) -> Result<ResponseEnvelope<GetLabelData>> {
		self.post("GetLabel", &req).await
	}
}
