use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// Response wrapper common to every service operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ResponseEnvelope<T> {
	#[serde(default)]
	pub request_id: Option<String>,
	#[serde(default)]
	pub success: Option<bool>,
	#[serde(default)]
	pub code: Option<String>,
	#[serde(default)]
	pub message: Option<String>,
	#[serde(default)]
	pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
	/// Request id for correlation, empty when the service omitted it.
	pub fn request_id(&self) -> String {
		self.request_id.clone().unwrap_or_default()
	}

	/// Returns `true` unless the service explicitly reported failure.
	pub fn succeeded(&self) -> bool {
		self.success.unwrap_or(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn envelope_parses_pascal_case_fields() {
		let text = r#"{"RequestId":"req-1","Success":true,"Data":{"SessionId":"s-1"}}"#;
		let envelope: ResponseEnvelope<serde_json::Value> = serde_json::from_str(text).unwrap();
		assert_eq!(envelope.request_id(), "req-1");
		assert!(envelope.succeeded());
		assert_eq!(envelope.data.unwrap()["SessionId"], "s-1");
	}

	#[test]
	fn missing_success_counts_as_succeeded() {
		let envelope: ResponseEnvelope<serde_json::Value> = serde_json::from_str("{}").unwrap();
		assert!(envelope.succeeded());
		assert_eq!(envelope.request_id(), "");
	}

	#[test]
	fn explicit_failure_is_reported() {
		let text = r#"{"RequestId":"req-2","Success":false,"Message":"quota exceeded"}"#;
		let envelope: ResponseEnvelope<serde_json::Value> = serde_json::from_str(text).unwrap();
		assert!(!envelope.succeeded());
		assert_eq!(envelope.message.as_deref(), Some("quota exceeded"));
	}
}
