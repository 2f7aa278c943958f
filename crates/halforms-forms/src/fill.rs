//! Value filling
//!
//! Produces a value-bearing copy of a synthesized template from the JSON
//! representation of an instance. The template given is never modified, so
//! one cached template serves any number of instances.

use crate::error::{FormsError, FormsResult};
use crate::synthesis::default_templates;
use halforms_core::naming::find_key;
use halforms_core::{DEFAULT_TEMPLATE, FormTemplate, NamingPolicy, Options, Property, PropertyType};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;

/// The instance being filled and the value found for one property
#[derive(Debug, Clone, Copy)]
pub struct ValueContext<'a> {
	pub instance: &'a Value,
	/// Value of the property's field, `None` when the instance lacks it
	pub value: Option<&'a Value>,
	pub naming: NamingPolicy,
}

/// A step run on each property while filling
pub trait PropertyValueRule: Send + Sync {
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	fn order(&self) -> i32 {
		0
	}

	/// Exclusive rules replace the default assignment of the value
	fn exclusive(&self) -> bool {
		false
	}

	fn applies_to(&self, ctx: &ValueContext<'_>, property: &Property) -> bool;

	fn apply(&self, ctx: &ValueContext<'_>, property: &mut Property) -> FormsResult<()>;
}

/// Fills templates with instance values
#[derive(Clone, Default)]
pub struct ValueFiller {
	naming: NamingPolicy,
	rules: Vec<Arc<dyn PropertyValueRule>>,
}

impl fmt::Debug for ValueFiller {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValueFiller")
			.field("naming", &self.naming)
			.field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
			.finish()
	}
}

impl ValueFiller {
	pub fn new(naming: NamingPolicy) -> Self {
		Self {
			naming,
			rules: Vec::new(),
		}
	}

	pub fn with_rule(mut self, rule: impl PropertyValueRule + 'static) -> Self {
		self.rules.push(Arc::new(rule));
		self
	}

	/// Returns a copy of `template` holding the values of `instance`
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::{FormTemplate, NamingPolicy, Property, PropertyType};
	/// use halforms_forms::ValueFiller;
	/// use serde_json::json;
	///
	/// let template = FormTemplate::new("PUT")
	///     .with_property(Property::typed("firstName", PropertyType::Text));
	/// let filled = ValueFiller::new(NamingPolicy::CamelCase)
	///     .fill_value(&template, &json!({"first_name": "Ada"}))
	///     .unwrap();
	///
	/// assert_eq!(filled.properties[0].value, Some(json!("Ada")));
	/// assert_eq!(template.properties[0].value, None);
	/// ```
	pub fn fill_value(&self, template: &FormTemplate, instance: &Value) -> FormsResult<FormTemplate> {
		let mut filled = template.clone();
		for property in &mut filled.properties {
			self.fill_property(property, instance)?;
		}
		Ok(filled)
	}

	fn fill_property(&self, property: &mut Property, instance: &Value) -> FormsResult<()> {
		let value = match instance {
			Value::Object(members) => find_key(members.keys(), &property.name, self.naming).and_then(|k| members.get(k)),
			_ => None,
		};
		let ctx = ValueContext {
			instance,
			value,
			naming: self.naming,
		};

		let mut rules: Vec<_> = self.rules.iter().filter(|r| r.applies_to(&ctx, property)).collect();
		rules.sort_by_key(|r| r.order());
		let exclusive = rules.iter().any(|r| r.exclusive());

		if !exclusive {
			if let Some(value) = value {
				property.value = (!value.is_null()).then(|| value.clone());
				self.normalize(property)?;
			}
		}
		for rule in rules.into_iter().filter(|r| !exclusive || r.exclusive()) {
			tracing::trace!(rule = rule.name(), property = %property.name, "Applying value rule");
			rule.apply(&ctx, property)?;
		}
		Ok(())
	}

	fn normalize(&self, property: &mut Property) -> FormsResult<()> {
		let Some(value) = property.value.take() else {
			return Ok(());
		};
		if let Some(options) = property.options_mut() {
			options.selected_values = selected_values(options, value);
			return Ok(());
		}
		match property.property_type() {
			Some(PropertyType::Collection) => self.fill_collection(property, &value),
			Some(PropertyType::Object) if value.is_object() => {
				let Some(nested) = property.default_template() else {
					property.value = Some(value);
					return Ok(());
				};
				let filled = self.fill_value(nested, &value)?;
				property.templates = Some(default_templates(filled));
				Ok(())
			}
			_ => {
				property.value = Some(value);
				Ok(())
			}
		}
	}

	/// Collections need exactly one nested template; choice lists carry
	/// options instead and never reach this point.
	fn fill_collection(&self, property: &mut Property, value: &Value) -> FormsResult<()> {
		let (Some(templates), Some(nested)) = (&property.templates, property.default_template()) else {
			return Err(FormsError::AmbiguousNestedTemplate {
				property: property.name.clone(),
			});
		};

		let entries: Vec<Value> = match value {
			Value::Array(elements) => elements.iter().map(|e| self.element(e)).collect(),
			Value::Object(entries) => entries
				.iter()
				.map(|(key, value)| {
					let mut entry = Map::new();
					entry.insert(self.naming.apply("key"), Value::String(key.clone()));
					entry.insert(self.naming.apply("value"), value.clone());
					Value::Object(entry)
				})
				.collect(),
			other => vec![self.element(other)],
		};

		let mut filled = templates.clone();
		if !filled.contains_key(DEFAULT_TEMPLATE) {
			filled = default_templates(nested.clone());
		}
		for (index, entry) in entries.iter().enumerate() {
			let index = index.to_string();
			let mut template = self.fill_value(nested, entry)?;
			template.title = Some(index.clone());
			filled.insert(index, template);
		}
		property.templates = Some(filled);
		Ok(())
	}

	/// Objects fill the element template directly; scalars fill its `value`
	fn element(&self, element: &Value) -> Value {
		if element.is_object() {
			element.clone()
		} else {
			json!({ self.naming.apply("value"): element })
		}
	}
}

/// Selection of an optioned property holding `value`
fn selected_values(options: &Options, value: Value) -> Vec<Value> {
	let selected = match value {
		Value::Array(elements) => elements,
		Value::Number(bits) if is_flags(options) => match bits.as_i64() {
			Some(bits) => flag_members(options, bits),
			None => vec![Value::Number(bits)],
		},
		other => vec![other],
	};
	selected.into_iter().map(|v| member_value(options, v)).collect()
}

fn is_flags(options: &Options) -> bool {
	!options.inline.is_empty() && options.max_items.is_none()
}

/// Members whose bits are all set in `bits`, the zero member excluded
fn flag_members(options: &Options, bits: i64) -> Vec<Value> {
	options
		.inline
		.iter()
		.filter_map(|option| option.value.as_i64())
		.filter(|member| *member != 0 && bits & member == *member)
		.map(Value::from)
		.collect()
}

/// Maps a member name, as serde writes unit variants, to the member value
fn member_value(options: &Options, value: Value) -> Value {
	let Value::String(name) = &value else {
		return value;
	};
	options
		.inline
		.iter()
		.find(|option| option.prompt == *name || option.prompt.eq_ignore_ascii_case(name))
		.map(|option| option.value.clone())
		.unwrap_or(value)
}
