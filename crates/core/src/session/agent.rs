//! Natural-language task execution on the remote sandbox agent.
//!
//! Tasks run asynchronously on the service side: starting one returns a task
//! id, and completion is observed by polling its status.

use std::sync::Arc;
use std::time::Duration;

use cloudbox_protocol::tool::CallToolRequest;
use serde_json::json;
use tracing::debug;

use super::SessionInner;
use crate::error::{Error, Result};
use crate::transport::check;

/// Seconds between status polls in [`Agent::execute_task`].
const TASK_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Status of a remote agent task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
	Running,
	Finished,
	Failed,
	Unsupported,
}

impl TaskStatus {
	fn parse(text: &str) -> Option<Self> {
		match text {
			"running" => Some(Self::Running),
			"finished" => Some(Self::Finished),
			"failed" => Some(Self::Failed),
			"unsupported" => Some(Self::Unsupported),
			_ => None,
		}
	}
}

/// Acknowledgement that a task was accepted by the agent.
#[derive(Debug, Clone)]
pub struct TaskStarted {
	/// Service request id for correlation.
	pub request_id: String,
	pub task_id: String,
}

/// Snapshot of a task's progress from a status poll.
#[derive(Debug, Clone)]
pub struct TaskQuery {
	pub request_id: String,
	pub task_id: String,
	pub status: TaskStatus,
	/// Step the agent is currently performing, when reported.
	pub action: Option<String>,
	/// Output produced so far, when reported.
	pub product: Option<String>,
}

/// Final output of a task that ran to completion.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
	pub request_id: String,
	pub task_id: String,
	pub product: String,
}

/// Thin wrapper over the agent task tools.
pub struct Agent {
	session: Arc<SessionInner>,
}

impl Agent {
	pub(crate) fn new(session: Arc<SessionInner>) -> Self {
		Self { session }
	}

	async fn call(&self, name: &str, args: serde_json::Value) -> Result<(String, serde_json::Value)> {
		let request = CallToolRequest {
			session_id: self.session.session_id.clone(),
			name: name.to_string(),
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
		let output = data.output.unwrap_or_default();
		let content: serde_json::Value = serde_json::from_str(&output)
			.map_err(|err| Error::remote("CallTool", format!("unparseable {name} output: {err}")))?;
		Ok((request_id, content))
	}

	/// Starts a task described in human language; does not wait for it.
	pub async fn start_task(&self, task: &str) -> Result<TaskStarted> {
		let (request_id, content) = self.call("flux_execute_task", json!({ "task": task })).await?;
		let task_id = content["task_id"]
			.as_str()
			.filter(|id| !id.is_empty())
			.ok_or_else(|| Error::remote("ExecuteTask", "response carried no task id"))?
			.to_string();
		debug!(target = "cloudbox.session", session_id = %self.session.session_id, task_id, "task started");
		Ok(TaskStarted { request_id, task_id })
	}

	/// Polls the status of a running task.
	pub async fn task_status(&self, task_id: &str) -> Result<TaskQuery> {
		let (request_id, content) = self.call("flux_get_task_status", json!({ "task_id": task_id })).await?;
		let raw_status = content["status"].as_str().unwrap_or_default().to_string();
		let status = TaskStatus::parse(&raw_status)
			.ok_or_else(|| Error::remote("GetTaskStatus", format!("unknown task status {raw_status:?}")))?;
		Ok(TaskQuery {
			request_id,
			task_id: content["task_id"].as_str().unwrap_or(task_id).to_string(),
			status,
			action: content["action"].as_str().filter(|a| !a.is_empty()).map(str::to_string),
			product: content["product"].as_str().map(str::to_string),
		})
	}

	/// Runs a task to completion, polling every few seconds.
	///
	/// `max_polls` bounds the number of status checks; a task still running
	/// after the last poll fails as timed out. Failed and unsupported tasks
	/// surface as [`Error::Remote`].
	pub async fn execute_task(&self, task: &str, max_polls: u32) -> Result<TaskOutcome> {
		let started = self.start_task(task).await?;

		for _ in 0..max_polls {
			let query = self.task_status(&started.task_id).await?;
			match query.status {
				TaskStatus::Finished => {
					return Ok(TaskOutcome {
						request_id: started.request_id,
						task_id: started.task_id,
						product: query.product.unwrap_or_default(),
					});
				}
				TaskStatus::Failed => {
					return Err(Error::remote("ExecuteTask", format!("task {} failed", started.task_id)));
				}
				TaskStatus::Unsupported => {
					return Err(Error::remote("ExecuteTask", format!("task {} is unsupported", started.task_id)));
				}
				TaskStatus::Running => {
					debug!(target = "cloudbox.session", task_id = %started.task_id, action = ?query.action, "task running");
					tokio::time::sleep(TASK_POLL_INTERVAL).await;
				}
			}
		}

		Err(Error::remote(
			"ExecuteTask",
			format!("task {} timed out after {max_polls} polls", started.task_id),
		))
	}

	/// Terminates a running task.
	pub async fn terminate_task(&self, task_id: &str) -> Result<TaskStarted> {
		let (request_id, content) = self.call("flux_terminate_task", json!({ "task_id": task_id })).await?;
		Ok(TaskStarted {
			request_id,
			task_id: content["task_id"].as_str().unwrap_or(task_id).to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::client::Cloudbox;
	use crate::config::Config;
	use crate::session::Session;
	use crate::transport::testing::StubTransport;

	fn agent_over(stub: StubTransport) -> (Cloudbox, Agent) {
		let client = Cloudbox::with_transport(Config::default(), Arc::new(stub));
		let session = Session::attach(client.inner().clone(), "sess-1".to_string(), false, None, None, None);
		let agent = session.agent();
		(client, agent)
	}

	#[tokio::test]
	async fn start_task_returns_the_task_id() {
		let (_client, agent) = agent_over(StubTransport::with_session("sess-1"));
		let started = agent.start_task("list the home directory").await.unwrap();
		assert_eq!(started.task_id, "task-1");
		assert_eq!(started.request_id, "req-test");
	}

	#[tokio::test]
	async fn execute_task_returns_the_product_when_finished() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.task_status = Some("finished".to_string());
		let (_client, agent) = agent_over(stub);

		let outcome = agent.execute_task("create a folder named data", 5).await.unwrap();
		assert_eq!(outcome.task_id, "task-1");
		assert_eq!(outcome.product, "done");
	}

	#[tokio::test]
	async fn failed_task_surfaces_as_remote_error() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.task_status = Some("failed".to_string());
		let (_client, agent) = agent_over(stub);

		let err = agent.execute_task("create a folder named data", 5).await.unwrap_err();
		assert!(matches!(err, Error::Remote { operation: "ExecuteTask", .. }));
	}

	#[tokio::test]
	async fn unsupported_task_surfaces_as_remote_error() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.task_status = Some("unsupported".to_string());
		let (_client, agent) = agent_over(stub);

		let err = agent.execute_task("fold a paper airplane", 5).await.unwrap_err();
		assert!(matches!(err, Error::Remote { operation: "ExecuteTask", .. }));
	}

	#[tokio::test(start_paused = true)]
	async fn still_running_task_times_out_after_max_polls() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.task_status = Some("running".to_string());
		let (_client, agent) = agent_over(stub);

		let err = agent.execute_task("never finishes", 3).await.unwrap_err();
		let message = err.to_string();
		assert!(message.contains("timed out after 3 polls"), "unexpected error: {message}");
	}

	#[tokio::test]
	async fn unknown_status_is_rejected() {
		let mut stub = StubTransport::with_session("sess-1");
		stub.task_status = Some("paused".to_string());
		let (_client, agent) = agent_over(stub);

		let err = agent.task_status("task-1").await.unwrap_err();
		assert!(matches!(err, Error::Remote { operation: "GetTaskStatus", .. }));
	}

	#[tokio::test]
	async fn terminate_task_echoes_the_task_id() {
		let (_client, agent) = agent_over(StubTransport::with_session("sess-1"));
		let ack = agent.terminate_task("task-1").await.unwrap();
		assert_eq!(ack.task_id, "task-1");
	}
}
