//! Session lifecycle operations: create, lookup, release, link resolution.

use serde::{Deserialize, Serialize};

/// Request body for `CreateSession`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSessionRequest {
	/// Sandbox image to boot.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image_id: Option<String>,
	/// Labels as a JSON object string, the encoding the service expects.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub labels: Option<String>,
	/// Persistent context to mount into the session.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context_id: Option<String>,
	/// Route traffic through a private network link instead of a public endpoint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vpc_resource: Option<bool>,
}

/// `Data` payload of a `CreateSession` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSessionData {
	#[serde(default)]
	pub session_id: Option<String>,
	#[serde(default)]
	pub resource_url: Option<String>,
	/// Port the private link proxies traffic through; VPC sessions only.
	#[serde(default)]
	pub http_port: Option<String>,
	#[serde(default)]
	pub network_interface_ip: Option<String>,
}

/// Request body for `GetSession`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetSessionRequest {
	pub session_id: String,
}

/// `Data` payload of a `GetSession` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetSessionData {
	#[serde(default)]
	pub session_id: Option<String>,
	#[serde(default)]
	pub resource_url: Option<String>,
	#[serde(default)]
	pub http_port: Option<String>,
	#[serde(default)]
	pub vpc_resource: Option<bool>,
}

/// Request body for `ReleaseSession`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReleaseSessionRequest {
	pub session_id: String,
	/// Flush the session's persistent context before teardown.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sync_context: Option<bool>,
}

/// Request body for `GetLink`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetLinkRequest {
	pub session_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub protocol_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub port: Option<i32>,
}

/// `Data` payload of a `GetLink` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetLinkData {
	#[serde(default)]
	pub url: Option<String>,
}
