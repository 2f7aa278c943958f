//! Document writer
//!
//! Members are emitted in a fixed order: state members, `_templates`,
//! `_links`, `_embedded`.

use super::members::to_state_value;
use super::options::SerializerOptions;
use super::{EMBEDDED_KEY, LINKS_KEY, TEMPLATES_KEY, is_reserved};
use crate::error::{HalError, HalResult};
use crate::resource::{Embedded, FormsResource, Resource};
use serde::Serialize;
use serde_json::{Map, Value};

/// Serializes a state payload into top-level document members
///
/// Naming and ignore policies apply to struct members at every depth.
pub(crate) fn write_state<S: Serialize>(
	state: Option<&S>,
	options: &SerializerOptions,
) -> HalResult<Map<String, Value>> {
	let Some(state) = state else {
		return Ok(Map::new());
	};
	let members = match to_state_value(state, options)? {
		Value::Null => return Ok(Map::new()),
		Value::Object(members) => members,
		_ => {
			return Err(HalError::InvalidState {
				type_name: std::any::type_name::<S>().to_string(),
			});
		}
	};

	let mut out = Map::with_capacity(members.len());
	for (key, value) in members {
		if is_reserved(&key) {
			tracing::warn!(member = %key, "State member collides with a reserved HAL member and is dropped");
			continue;
		}
		out.insert(key, value);
	}
	Ok(out)
}

fn write_links_and_embedded<S>(
	out: &mut Map<String, Value>,
	resource: &Resource<S>,
	options: &SerializerOptions,
) -> HalResult<()> {
	if let Some(links) = &resource.links {
		out.insert(LINKS_KEY.to_string(), serde_json::to_value(links)?);
	}
	if let Some(embedded) = &resource.embedded {
		out.insert(EMBEDDED_KEY.to_string(), write_embedded(embedded, options)?);
	}
	Ok(())
}

fn write_embedded(embedded: &Embedded, options: &SerializerOptions) -> HalResult<Value> {
	let mut out = Map::with_capacity(embedded.len());
	for (rel, resources) in embedded {
		let items = resources
			.iter()
			.map(|r| write_resource(r, options).map(Value::Object))
			.collect::<HalResult<Vec<_>>>()?;
		out.insert(rel.clone(), Value::Array(items));
	}
	Ok(Value::Object(out))
}

pub(crate) fn write_resource<S: Serialize>(
	resource: &Resource<S>,
	options: &SerializerOptions,
) -> HalResult<Map<String, Value>> {
	let mut out = write_state(resource.state.as_ref(), options)?;
	write_links_and_embedded(&mut out, resource, options)?;
	Ok(out)
}

pub(crate) fn write_forms_resource<S: Serialize>(
	forms: &FormsResource<S>,
	options: &SerializerOptions,
) -> HalResult<Map<String, Value>> {
	let mut out = write_state(forms.resource.state.as_ref(), options)?;
	if !forms.templates.is_empty() {
		out.insert(TEMPLATES_KEY.to_string(), serde_json::to_value(&forms.templates)?);
	}
	write_links_and_embedded(&mut out, &forms.resource, options)?;
	Ok(out)
}
