//! Error types for document modeling and serialization

/// Errors raised while building, reading or writing HAL documents
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum HalError {
	/// The wire input is not a well-formed HAL document
	#[error("Malformed HAL document: {0}")]
	Parse(String),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	/// No binding strategy could materialize the typed state
	#[error("Cannot bind state to `{type_name}`: {message}")]
	Binding { type_name: String, message: String },
	/// The state value does not serialize to a JSON object
	#[error("State of type `{type_name}` must serialize to a JSON object")]
	InvalidState { type_name: String },
	#[error("A forms resource requires at least one template")]
	InvalidTemplates,
	#[error("Settings error: {0}")]
	Settings(String),
}

impl HalError {
	pub(crate) fn parse(message: impl Into<String>) -> Self {
		Self::Parse(message.into())
	}

	pub(crate) fn binding<S>(message: impl Into<String>) -> Self {
		Self::Binding {
			type_name: std::any::type_name::<S>().to_string(),
			message: message.into(),
		}
	}
}

pub type HalResult<T> = Result<T, HalError>;
