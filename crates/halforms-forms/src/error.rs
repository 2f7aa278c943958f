//! Error types for template synthesis and filling

use halforms_core::HalError;

/// Errors raised while synthesizing, filling or generating forms
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FormsError {
	/// A foreign-key target has no key field
	#[error("`{type_name}` has no primary key: mark a field as key or declare an `id` field")]
	NoPrimaryKey { type_name: String },
	/// A foreign-key target has no unambiguous display field
	#[error("Cannot choose a display column for `{type_name}`: declare one on the type")]
	AmbiguousDisplayColumn { type_name: String },
	/// A shape contains itself and cycles are configured as errors
	#[error("`{type_name}` contains itself: {path}")]
	CyclicShape { type_name: String, path: String },
	/// A property to be filled does not have exactly one nested template
	#[error("Property `{property}` needs a single nested template named `default`")]
	AmbiguousNestedTemplate { property: String },
	#[error("Link error: {0}")]
	Link(String),
	#[error("Rule `{rule}` failed: {message}")]
	Rule { rule: String, message: String },
	#[error(transparent)]
	Core(#[from] HalError),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type FormsResult<T> = Result<T, FormsError>;
