//! Document reader
//!
//! Reads a document in a single pass over its members. Reserved members are
//! typed; everything else lands in the state bag in document order. Any
//! structural problem aborts the whole read.

use super::{EMBEDDED_KEY, LINKS_KEY, TEMPLATES_KEY};
use crate::error::{HalError, HalResult};
use crate::link::{Link, Links};
use crate::resource::{DynamicState, Embedded, Resource};
use crate::template::FormTemplate;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Members of a document split into their HAL roles
#[derive(Debug, Default)]
pub(crate) struct ScannedDocument {
	pub state: DynamicState,
	pub links: Option<Links>,
	pub embedded: Option<Embedded>,
	pub templates: Option<IndexMap<String, FormTemplate>>,
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

fn expect_object(value: Value, what: &str) -> HalResult<Map<String, Value>> {
	match value {
		Value::Object(members) => Ok(members),
		other => Err(HalError::parse(format!(
			"{} must be a JSON object, found {}",
			what,
			kind_of(&other)
		))),
	}
}

/// Splits a document into state, links, embedded resources and, when
/// `forms` is set, templates.
pub(crate) fn scan(document: Value, forms: bool) -> HalResult<ScannedDocument> {
	let members = expect_object(document, "A HAL document")?;
	let mut scanned = ScannedDocument::default();

	for (key, value) in members {
		match key.as_str() {
			LINKS_KEY => scanned.links = Some(read_links(value)?),
			EMBEDDED_KEY => scanned.embedded = Some(read_embedded(value)?),
			TEMPLATES_KEY if forms => scanned.templates = Some(read_templates(value)?),
			_ => {
				scanned.state.insert(key, value);
			}
		}
	}
	Ok(scanned)
}

fn read_link(rel: &str, value: Value) -> HalResult<Link> {
	serde_json::from_value(value)
		.map_err(|e| HalError::parse(format!("Invalid link for relation `{}`: {}", rel, e)))
}

/// Reads `_links`; a relation may hold one link object or an array of them
fn read_links(value: Value) -> HalResult<Links> {
	let members = expect_object(value, "`_links`")?;
	let mut links = Links::with_capacity(members.len());
	for (rel, value) in members {
		let list = match value {
			Value::Array(items) => items
				.into_iter()
				.map(|item| read_link(&rel, item))
				.collect::<HalResult<Vec<_>>>()?,
			single @ Value::Object(_) => vec![read_link(&rel, single)?],
			other => {
				return Err(HalError::parse(format!(
					"Relation `{}` in `_links` must hold a link or an array of links, found {}",
					rel,
					kind_of(&other)
				)));
			}
		};
		links.insert(rel, list);
	}
	Ok(links)
}

/// Reads `_embedded`; embedded resources always carry dynamic state
fn read_embedded(value: Value) -> HalResult<Embedded> {
	let members = expect_object(value, "`_embedded`")?;
	let mut embedded = Embedded::with_capacity(members.len());
	for (rel, value) in members {
		let list = match value {
			Value::Array(items) => items
				.into_iter()
				.map(read_dynamic_resource)
				.collect::<HalResult<Vec<_>>>()?,
			single @ Value::Object(_) => vec![read_dynamic_resource(single)?],
			other => {
				return Err(HalError::parse(format!(
					"Relation `{}` in `_embedded` must hold a resource or an array of resources, found {}",
					rel,
					kind_of(&other)
				)));
			}
		};
		embedded.insert(rel, list);
	}
	Ok(embedded)
}

pub(crate) fn read_dynamic_resource(value: Value) -> HalResult<Resource> {
	let scanned = scan(value, false)?;
	Ok(Resource {
		state: (!scanned.state.is_empty()).then_some(scanned.state),
		links: scanned.links,
		embedded: scanned.embedded,
	})
}

fn read_templates(value: Value) -> HalResult<IndexMap<String, FormTemplate>> {
	let members = expect_object(value, "`_templates`")?;
	let mut templates = IndexMap::with_capacity(members.len());
	for (name, value) in members {
		let template = serde_json::from_value(value)
			.map_err(|e| HalError::parse(format!("Invalid template `{}`: {}", name, e)))?;
		templates.insert(name, template);
	}
	Ok(templates)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_single_link_object_is_accepted() {
		let scanned = scan(
			json!({"_links": {"self": {"href": "/a"}, "item": [{"href": "/b"}, {"href": "/c"}]}}),
			false,
		)
		.unwrap();
		let links = scanned.links.unwrap();
		assert_eq!(links["self"].len(), 1);
		assert_eq!(links["item"][1].href, "/c");
	}

	#[rstest]
	fn test_state_keeps_document_order() {
		let scanned = scan(json!({"zeta": 1, "_links": {}, "alpha": 2}), false).unwrap();
		let keys: Vec<&str> = scanned.state.keys().map(String::as_str).collect();
		assert_eq!(keys, ["zeta", "alpha"]);
	}

	#[rstest]
	fn test_templates_are_state_outside_forms() {
		let document = json!({"_templates": {"default": {"properties": []}}});
		let scanned = scan(document.clone(), false).unwrap();
		assert!(scanned.templates.is_none());
		assert!(scanned.state.contains_key("_templates"));

		let scanned = scan(document, true).unwrap();
		assert_eq!(scanned.templates.unwrap()["default"].method, "GET");
	}

	#[rstest]
	#[case(json!([1, 2]))]
	#[case(json!({"_links": []}))]
	#[case(json!({"_links": {"self": "/a"}}))]
	#[case(json!({"_links": {"self": {"title": "no href"}}}))]
	#[case(json!({"_embedded": {"items": [1]}}))]
	fn test_malformed_documents_fail(#[case] document: Value) {
		assert!(matches!(scan(document, false), Err(HalError::Parse(_))));
	}

	#[rstest]
	fn test_embedded_read_recursively() {
		let scanned = scan(
			json!({"_embedded": {"items": {"id": 1, "_links": {"self": {"href": "/items/1"}}}}}),
			false,
		)
		.unwrap();
		let embedded = scanned.embedded.unwrap();
		let item = &embedded["items"][0];
		assert_eq!(item.state.as_ref().unwrap()["id"], json!(1));
		assert_eq!(item.self_link().unwrap().href, "/items/1");
	}
}
