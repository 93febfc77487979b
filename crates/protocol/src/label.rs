//! Session label operations.

use serde::{Deserialize, Serialize};

/// Request body for `SetLabel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetLabelRequest {
	pub session_id: String,
	/// Labels as a JSON object string.
	pub labels: String,
}

/// Request body for `GetLabel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetLabelRequest {
	pub session_id: String,
}

/// `Data` payload of a `GetLabel` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetLabelData {
	/// Labels as a JSON object string, absent when the session has none.
	#[serde(default)]
	pub labels: Option<String>,
}
