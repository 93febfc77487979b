use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("initialization failed: {0}")]
	Init(String),

	/// Operation attempted on a handle or snapshot that lacks required
	/// identifying data.
	#[error("invalid session state: {0}")]
	InvalidState(String),

	/// Snapshot text could not be decoded into a usable session state.
	/// A data problem, not a transient condition; retrying will not help.
	#[error("snapshot decode failed: {0}")]
	Decode(String),

	/// Failure reported by the hosted service for a remote operation.
	#[error("remote call {operation} failed: {message}")]
	Remote { operation: &'static str, message: String },

	#[error(transparent)]
	Http(#[from] reqwest::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub(crate) fn remote(operation: &'static str, message: impl Into<String>) -> Self {
		Error::Remote { operation, message: message.into() }
	}
}
