//! Library settings
//!
//! Settings are plain serde structs with defaults for every member, so a
//! settings file only needs to name what it changes:
//!
//! ```toml
//! naming_policy = "snake_case"
//! ignore_condition = "when_null"
//!
//! [forms]
//! default_method = "POST"
//! cycle_policy = "error"
//! ```

use crate::error::{HalError, HalResult};
use crate::naming::NamingPolicy;
use crate::serialization::{IgnoreCondition, SerializerOptions};
use crate::template::{DEFAULT_CONTENT_TYPE, DEFAULT_METHOD};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What template synthesis does when a type contains itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
	/// Emit an empty nested template at the point of recursion
	#[default]
	Truncate,
	/// Fail synthesis with a configuration error
	Error,
}

/// Template synthesis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsSettings {
	pub default_method: String,
	pub default_content_type: String,
	/// Treat fields named `…Id` as foreign keys to their sibling field
	pub foreign_key_convention: bool,
	pub cycle_policy: CyclePolicy,
}

impl Default for FormsSettings {
	fn default() -> Self {
		Self {
			default_method: DEFAULT_METHOD.to_string(),
			default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
			foreign_key_convention: true,
			cycle_policy: CyclePolicy::default(),
		}
	}
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HalSettings {
	pub naming_policy: NamingPolicy,
	pub ignore_condition: IgnoreCondition,
	pub forms: FormsSettings,
}

impl HalSettings {
	/// Parses settings from TOML
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::{HalSettings, NamingPolicy};
	///
	/// let settings = HalSettings::from_toml_str("naming_policy = \"preserve\"").unwrap();
	/// assert_eq!(settings.naming_policy, NamingPolicy::Preserve);
	/// assert_eq!(settings.forms.default_method, "GET");
	/// ```
	pub fn from_toml_str(source: &str) -> HalResult<Self> {
		toml::from_str(source).map_err(|e| HalError::Settings(e.to_string()))
	}

	pub fn from_toml_file(path: impl AsRef<Path>) -> HalResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path)
			.map_err(|e| HalError::Settings(format!("{}: {}", path.display(), e)))?;
		Self::from_toml_str(&source)
	}

	/// Options for the document serializer derived from these settings
	pub fn serializer_options(&self) -> SerializerOptions {
		SerializerOptions::new()
			.naming_policy(self.naming_policy)
			.ignore_condition(self.ignore_condition)
	}
}
