//! Command execution on the remote sandbox.

use std::sync::Arc;

use cloudbox_protocol::tool::CallToolRequest;
use serde_json::json;
use tracing::debug;

use super::SessionInner;
use crate::error::{Error, Result};
use crate::transport::check;

/// Output of a remote command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
	/// Service request id for correlation.
	pub request_id: String,
	/// Combined stdout/stderr of the command.
	pub output: String,
}

/// Thin wrapper over the `shell` tool RPC.
pub struct Command {
	session: Arc<SessionInner>,
}

impl Command {
	pub(crate) fn new(session: Arc<SessionInner>) -> Self {
		Self { session }
	}

	/// Runs `command` in the remote sandbox with a millisecond timeout.
	pub async fn execute(&self, command: &str, timeout_ms: u64) -> Result<CommandOutput> {
		debug!(target = "cloudbox.session", session_id = %self.session.session_id, timeout_ms, "executing command");
		let args = json!({ "command": command, "timeout_ms": timeout_ms });
		let request = CallToolRequest {
			session_id: self.session.session_id.clone(),
			name: "shell".to_string(),
			args: args.to_string(),
		};

		let envelope = self.session.client.transport.call_tool(request).await?;
		let request_id = envelope.request_id();
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

		Ok(CommandOutput {
			request_id,
			output: data.output.unwrap_or_default(),
		})
	}
}
