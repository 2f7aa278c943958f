//! Serializer configuration

use crate::naming::NamingPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// When a state member is left out of the written document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreCondition {
	/// Always written
	#[default]
	Never,
	/// Never written
	Always,
	/// Skipped when null, `false` or numerically zero
	WhenDefault,
	/// Skipped when null
	WhenNull,
}

impl IgnoreCondition {
	/// Returns true when a member holding `value` must be omitted
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::IgnoreCondition;
	/// use serde_json::json;
	///
	/// assert!(IgnoreCondition::WhenNull.skips(&json!(null)));
	/// assert!(!IgnoreCondition::WhenNull.skips(&json!(0)));
	/// assert!(IgnoreCondition::WhenDefault.skips(&json!(0)));
	/// assert!(!IgnoreCondition::WhenDefault.skips(&json!("")));
	/// ```
	pub fn skips(&self, value: &Value) -> bool {
		match self {
			IgnoreCondition::Never => false,
			IgnoreCondition::Always => true,
			IgnoreCondition::WhenNull => value.is_null(),
			IgnoreCondition::WhenDefault => match value {
				Value::Null => true,
				Value::Bool(b) => !b,
				Value::Number(n) => n.as_f64() == Some(0.0),
				_ => false,
			},
		}
	}
}

/// Options of [`HalSerializer`](super::HalSerializer)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SerializerOptions {
	pub naming: NamingPolicy,
	pub ignore: IgnoreCondition,
	/// Per-member overrides keyed by declared member name; these win over `ignore`
	pub field_conditions: HashMap<String, IgnoreCondition>,
}

impl SerializerOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn naming_policy(mut self, naming: NamingPolicy) -> Self {
		self.naming = naming;
		self
	}

	pub fn ignore_condition(mut self, ignore: IgnoreCondition) -> Self {
		self.ignore = ignore;
		self
	}

	/// Overrides the ignore condition of one state member
	pub fn field_condition(mut self, field: impl Into<String>, condition: IgnoreCondition) -> Self {
		self.field_conditions.insert(field.into(), condition);
		self
	}

	/// Effective condition for a declared member name
	pub fn condition_for(&self, field: &str) -> IgnoreCondition {
		self.field_conditions.get(field).copied().unwrap_or(self.ignore)
	}
}
