//! Tool invocation: the single RPC behind command execution and file access.

use serde::{Deserialize, Serialize};

/// Request body for `CallTool`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallToolRequest {
	pub session_id: String,
	/// Tool name, e.g. `shell` or `read_file`.
	pub name: String,
	/// Tool arguments as a JSON object string.
	pub args: String,
}

/// `Data` payload of a `CallTool` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallToolData {
	#[serde(default)]
	pub output: Option<String>,
	/// Set when the tool itself failed even though the RPC succeeded.
	#[serde(default)]
	pub is_error: Option<bool>,
}
