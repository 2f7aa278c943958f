//! Terminal rule backfilling values of required, unmodifiable fields

use super::{FieldContext, PropertyRule};
use crate::cache::DefaultValueCache;
use crate::error::FormsResult;
use halforms_core::naming::normalize_key;
use halforms_core::{Property, PropertyType};
use serde_json::Value;
use std::sync::Arc;

/// Copies the value of a field from the default instance of its owner when
/// the field is required, read-only or hidden, and has no value yet.
///
/// Default instances are built once per type; a failing construction is
/// remembered and never retried.
#[derive(Clone)]
pub struct DefaultValueRule {
	cache: Arc<dyn DefaultValueCache>,
}

impl DefaultValueRule {
	pub fn new(cache: Arc<dyn DefaultValueCache>) -> Self {
		Self { cache }
	}

	fn default_instance(&self, ctx: &FieldContext<'_>) -> Option<Value> {
		let owner = ctx.owner_ref?;
		if let Some(memoized) = self.cache.get(owner.id()) {
			return memoized;
		}
		let built = match ctx.owner.default_instance() {
			Some(Ok(value)) => Some(value),
			Some(Err(reason)) => {
				tracing::debug!(owner = %ctx.owner.name, %reason, "Default instance construction failed");
				None
			}
			None => None,
		};
		self.cache.get_or_insert(owner.id(), built)
	}
}

impl PropertyRule for DefaultValueRule {
	fn name(&self) -> &str {
		"default-value"
	}

	fn order(&self) -> i32 {
		i32::MAX
	}

	fn applies_to(&self, _ctx: &FieldContext<'_>) -> bool {
		true
	}

	fn apply(&self, ctx: &FieldContext<'_>, property: &mut Property) -> FormsResult<()> {
		let unmodifiable = property.read_only || property.is_type(PropertyType::Hidden);
		if !property.required || !unmodifiable || property.value.is_some() {
			return Ok(());
		}
		let Some(Value::Object(instance)) = self.default_instance(ctx) else {
			return Ok(());
		};
		let declared = &ctx.field.name;
		let value = instance.get(declared.as_str()).or_else(|| {
			let normalized = normalize_key(declared);
			instance
				.iter()
				.find(|(k, _)| normalize_key(k) == normalized)
				.map(|(_, v)| v)
		});
		if let Some(value) = value {
			property.value = Some(value.clone());
		}
		Ok(())
	}
}
