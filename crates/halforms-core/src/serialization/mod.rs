//! HAL / HAL-Forms JSON serialization
//!
//! State members are merged into the top level of the document next to the
//! reserved `_links`, `_embedded` and `_templates` members.

mod binding;
mod members;
mod options;
mod reader;
mod writer;

pub use binding::{StateBinder, struct_fields};
pub use members::{from_state_value, to_state_value};
pub use options::{IgnoreCondition, SerializerOptions};

use crate::error::{HalError, HalResult};
use crate::resource::{FormsResource, Resource};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub const LINKS_KEY: &str = "_links";
pub const EMBEDDED_KEY: &str = "_embedded";
pub const TEMPLATES_KEY: &str = "_templates";

/// True for member names with a HAL meaning
pub fn is_reserved(key: &str) -> bool {
	matches!(key, LINKS_KEY | EMBEDDED_KEY | TEMPLATES_KEY)
}

/// Reads and writes HAL and HAL-Forms documents
#[derive(Debug, Clone, Default)]
pub struct HalSerializer {
	options: SerializerOptions,
}

impl HalSerializer {
	pub fn new(options: SerializerOptions) -> Self {
		Self { options }
	}

	pub fn options(&self) -> &SerializerOptions {
		&self.options
	}

	pub fn to_value<S: Serialize>(&self, resource: &Resource<S>) -> HalResult<Value> {
		writer::write_resource(resource, &self.options).map(Value::Object)
	}

	/// Writes a resource as a JSON string
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::{HalSerializer, Resource};
	/// use serde_json::json;
	///
	/// let state = json!({"total_price": 9.5}).as_object().unwrap().clone();
	/// let resource = Resource::new(state).with_self_link("/orders/1");
	/// let json = HalSerializer::default().to_string(&resource).unwrap();
	/// assert_eq!(json, r#"{"totalPrice":9.5,"_links":{"self":[{"href":"/orders/1"}]}}"#);
	/// ```
	pub fn to_string<S: Serialize>(&self, resource: &Resource<S>) -> HalResult<String> {
		Ok(serde_json::to_string(&self.to_value(resource)?)?)
	}

	pub fn forms_to_value<S: Serialize>(&self, forms: &FormsResource<S>) -> HalResult<Value> {
		writer::write_forms_resource(forms, &self.options).map(Value::Object)
	}

	pub fn forms_to_string<S: Serialize>(&self, forms: &FormsResource<S>) -> HalResult<String> {
		Ok(serde_json::to_string(&self.forms_to_value(forms)?)?)
	}

	/// Reads a resource, binding its state with the default [`StateBinder`]
	pub fn from_value<S>(&self, document: Value) -> HalResult<Resource<S>>
	where
		S: Serialize + DeserializeOwned,
	{
		self.from_value_with(document, &StateBinder::new())
	}

	pub fn from_value_with<S>(&self, document: Value, binder: &StateBinder<S>) -> HalResult<Resource<S>>
	where
		S: Serialize + DeserializeOwned,
	{
		let scanned = reader::scan(document, false)?;
		Ok(Resource {
			state: binder.bind(scanned.state, self.options.naming)?,
			links: scanned.links,
			embedded: scanned.embedded,
		})
	}

	pub fn from_str<S>(&self, json: &str) -> HalResult<Resource<S>>
	where
		S: Serialize + DeserializeOwned,
	{
		self.from_value(parse_document(json)?)
	}

	/// Reads a forms resource; a document without `_templates` is rejected
	pub fn forms_from_value<S>(&self, document: Value) -> HalResult<FormsResource<S>>
	where
		S: Serialize + DeserializeOwned,
	{
		self.forms_from_value_with(document, &StateBinder::new())
	}

	pub fn forms_from_value_with<S>(
		&self,
		document: Value,
		binder: &StateBinder<S>,
	) -> HalResult<FormsResource<S>>
	where
		S: Serialize + DeserializeOwned,
	{
		let scanned = reader::scan(document, true)?;
		let resource = Resource {
			state: binder.bind(scanned.state, self.options.naming)?,
			links: scanned.links,
			embedded: scanned.embedded,
		};
		FormsResource::with_templates(resource, scanned.templates.unwrap_or_default())
	}

	pub fn forms_from_str<S>(&self, json: &str) -> HalResult<FormsResource<S>>
	where
		S: Serialize + DeserializeOwned,
	{
		self.forms_from_value(parse_document(json)?)
	}
}

fn parse_document(json: &str) -> HalResult<Value> {
	serde_json::from_str(json).map_err(|e| HalError::parse(e.to_string()))
}

impl<S: Serialize> Serialize for Resource<S> {
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		writer::write_resource(self, &SerializerOptions::default())
			.map_err(serde::ser::Error::custom)?
			.serialize(serializer)
	}
}

impl<'de, S> Deserialize<'de> for Resource<S>
where
	S: Serialize + DeserializeOwned,
{
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let document = Value::deserialize(deserializer)?;
		HalSerializer::default()
			.from_value(document)
			.map_err(serde::de::Error::custom)
	}
}

impl<S: Serialize> Serialize for FormsResource<S> {
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		writer::write_forms_resource(self, &SerializerOptions::default())
			.map_err(serde::ser::Error::custom)?
			.serialize(serializer)
	}
}

impl<'de, S> Deserialize<'de> for FormsResource<S>
where
	S: Serialize + DeserializeOwned,
{
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let document = Value::deserialize(deserializer)?;
		HalSerializer::default()
			.forms_from_value(document)
			.map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::link::Link;
	use crate::naming::NamingPolicy;
	use crate::resource::DynamicState;
	use crate::template::{FormTemplate, Property, PropertyType};
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Order {
		order_number: u32,
		status: String,
	}

	#[fixture]
	fn serializer() -> HalSerializer {
		HalSerializer::default()
	}

	#[rstest]
	fn test_typed_state_round_trip(serializer: HalSerializer) {
		let resource = Resource::new(Order {
			order_number: 42,
			status: "shipped".to_string(),
		})
		.with_self_link("/orders/42");
		let value = serializer.to_value(&resource).unwrap();
		assert_eq!(
			value,
			json!({"orderNumber": 42, "status": "shipped", "_links": {"self": [{"href": "/orders/42"}]}})
		);

		let read: Resource<Order> = serializer.from_value(value).unwrap();
		assert_eq!(read, resource);
	}

	#[rstest]
	fn test_dynamic_state_keeps_unknown_members(serializer: HalSerializer) {
		let read: Resource = serializer
			.from_str(r#"{"b": 1, "a": {"nested": true}, "_links": {"self": {"href": "/x"}}}"#)
			.unwrap();
		let state = read.state.unwrap();
		assert_eq!(state.keys().collect::<Vec<_>>(), ["b", "a"]);
		assert_eq!(read.links.unwrap()["self"][0].href, "/x");
	}

	#[rstest]
	fn test_syntax_error_is_parse_error(serializer: HalSerializer) {
		let result = serializer.from_str::<DynamicState>("{\"a\": ");
		assert!(matches!(result, Err(HalError::Parse(_))));
	}

	#[rstest]
	fn test_forms_resource_round_trip(serializer: HalSerializer) {
		let template = FormTemplate::new("POST").with_property(Property::typed("status", PropertyType::Text));
		let forms = FormsResource::new(
			Some(Order {
				order_number: 1,
				status: "new".to_string(),
			}),
			template,
		)
		.with_link("self", Link::new("/orders/1"));

		let json = serializer.forms_to_string(&forms).unwrap();
		let read: FormsResource<Order> = serializer.forms_from_str(&json).unwrap();
		assert_eq!(read, forms);
	}

	#[rstest]
	fn test_forms_without_templates_rejected(serializer: HalSerializer) {
		let result = serializer.forms_from_value::<DynamicState>(json!({"a": 1}));
		assert!(matches!(result, Err(HalError::InvalidTemplates)));
	}

	#[rstest]
	fn test_snake_case_policy() {
		let serializer = HalSerializer::new(SerializerOptions::new().naming_policy(NamingPolicy::SnakeCase));
		let resource = Resource::new(Order {
			order_number: 3,
			status: "open".to_string(),
		});
		let value = serializer.to_value(&resource).unwrap();
		assert_eq!(value, json!({"order_number": 3, "status": "open"}));
	}

	#[rstest]
	fn test_serde_impls_embed_in_other_types() {
		#[derive(Serialize, Deserialize)]
		struct Envelope {
			payload: Resource,
		}
		let envelope: Envelope = serde_json::from_value(json!({
			"payload": {"id": 1, "_embedded": {"items": [{"id": 2}]}}
		}))
		.unwrap();
		assert_eq!(envelope.payload.embedded_for("items").len(), 1);
		let back = serde_json::to_value(&envelope).unwrap();
		assert_eq!(back["payload"]["_embedded"]["items"][0]["id"], json!(2));
	}

	#[rstest]
	fn test_reserved_names() {
		assert!(is_reserved("_links"));
		assert!(!is_reserved("links"));
	}
}
