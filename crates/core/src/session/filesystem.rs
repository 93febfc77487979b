//! File access on the remote sandbox.
//!
//! Thin wrappers over file tools. Bulk upload/download runs through the
//! persistent file-transfer context, outside this SDK.

use std::sync::Arc;

use cloudbox_protocol::tool::CallToolRequest;
use serde_json::json;

use super::SessionInner;
use crate::error::{Error, Result};
use crate::transport::check;

/// Remote file operations for one session.
pub struct FileSystem {
	session: Arc<SessionInner>,
}

impl FileSystem {
	pub(crate) fn new(session: Arc<SessionInner>) -> Self {
		Self { session }
	}

	async fn call(&self, name: &str, args: serde_json::Value) -> Result<String> {
		let request = CallToolRequest {
			session_id: self.session.session_id.clone(),
			name: name.to_string(),
			args: args.to_string(),
		};
		let envelope = self.session.client.transport.call_tool(request).await?;
		let envelope = check("CallTool", envelope)?;
		let data = envelope
			.data
			.ok_or_else(|| Error::remote("CallTool", "response carried no data"))?;
		if data.is_error.unwrap_or(false) {
			return Err(Error::remote(
				"CallTool",
				data.output.unwrap_or_else(|| "tool reported failure".to_string()),
			));
		}
		Ok(data.output.unwrap_or_default())
	}

	/// Reads a remote file and returns its content.
	pub async fn read_file(&self, path: &str) -> Result<String> {
		self.call("read_file", json!({ "path": path })).await
	}

	/// Writes `content` to a remote file, creating it if needed.
	pub async fn write_file(&self, path: &str, content: &str) -> Result<()> {
		self.call("write_file", json!({ "path": path, "content": content })).await?;
		Ok(())
	}

	/// Creates a remote directory, including missing parents.
	pub async fn create_directory(&self, path: &str) -> Result<()> {
		self.call("create_directory", json!({ "path": path })).await?;
		Ok(())
	}
}
