//! HAL-Forms templates and properties

use crate::options::Options;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Conventional name of a resource's primary template
pub const DEFAULT_TEMPLATE: &str = "default";
/// Content type a template is submitted with unless stated otherwise
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
/// Method a template is submitted with unless stated otherwise
pub const DEFAULT_METHOD: &str = "GET";

/// Input type of a form property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
	Hidden,
	Text,
	Textarea,
	Search,
	Tel,
	Url,
	Email,
	Password,
	Date,
	Month,
	Week,
	Time,
	DatetimeLocal,
	Number,
	Range,
	Color,
	Bool,
	DatetimeOffset,
	Duration,
	Image,
	File,
	Collection,
	Object,
	Percent,
	Currency,
}

impl PropertyType {
	pub const ALL: [PropertyType; 25] = [
		PropertyType::Hidden,
		PropertyType::Text,
		PropertyType::Textarea,
		PropertyType::Search,
		PropertyType::Tel,
		PropertyType::Url,
		PropertyType::Email,
		PropertyType::Password,
		PropertyType::Date,
		PropertyType::Month,
		PropertyType::Week,
		PropertyType::Time,
		PropertyType::DatetimeLocal,
		PropertyType::Number,
		PropertyType::Range,
		PropertyType::Color,
		PropertyType::Bool,
		PropertyType::DatetimeOffset,
		PropertyType::Duration,
		PropertyType::Image,
		PropertyType::File,
		PropertyType::Collection,
		PropertyType::Object,
		PropertyType::Percent,
		PropertyType::Currency,
	];

	/// Wire name of the type
	pub fn as_str(&self) -> &'static str {
		match self {
			PropertyType::Hidden => "hidden",
			PropertyType::Text => "text",
			PropertyType::Textarea => "textarea",
			PropertyType::Search => "search",
			PropertyType::Tel => "tel",
			PropertyType::Url => "url",
			PropertyType::Email => "email",
			PropertyType::Password => "password",
			PropertyType::Date => "date",
			PropertyType::Month => "month",
			PropertyType::Week => "week",
			PropertyType::Time => "time",
			PropertyType::DatetimeLocal => "datetime-local",
			PropertyType::Number => "number",
			PropertyType::Range => "range",
			PropertyType::Color => "color",
			PropertyType::Bool => "bool",
			PropertyType::DatetimeOffset => "datetime-offset",
			PropertyType::Duration => "duration",
			PropertyType::Image => "image",
			PropertyType::File => "file",
			PropertyType::Collection => "collection",
			PropertyType::Object => "object",
			PropertyType::Percent => "percent",
			PropertyType::Currency => "currency",
		}
	}
}

impl fmt::Display for PropertyType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a name does not designate a [`PropertyType`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown property type: {0}")]
pub struct UnknownPropertyType(pub String);

impl FromStr for PropertyType {
	type Err = UnknownPropertyType;

	/// Parses wire names and declared names alike, ignoring case and separators
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::PropertyType;
	///
	/// assert_eq!("datetime-local".parse(), Ok(PropertyType::DatetimeLocal));
	/// assert_eq!("DatetimeLocal".parse(), Ok(PropertyType::DatetimeLocal));
	/// assert!("spreadsheet".parse::<PropertyType>().is_err());
	/// ```
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = crate::naming::normalize_key(s.trim());
		PropertyType::ALL
			.iter()
			.copied()
			.find(|t| crate::naming::normalize_key(t.as_str()) == wanted)
			.ok_or_else(|| UnknownPropertyType(s.to_string()))
	}
}

/// Display mode of a property's prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptDisplay {
	#[default]
	Visible,
	Hidden,
	Collapsed,
}

/// What kind of input a property accepts: a typed value or a choice among options.
///
/// Encoding the two as one union keeps `type` and `options` from ever being
/// set together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKind {
	#[serde(rename = "type")]
	Typed(PropertyType),
	#[serde(rename = "options")]
	Optioned(Options),
}

fn is_false(value: &bool) -> bool {
	!*value
}

/// One field descriptor of a form template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prompt: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub placeholder: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prompt_display: Option<PromptDisplay>,
	#[serde(flatten)]
	pub kind: Option<PropertyKind>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(default, skip_serializing_if = "is_false")]
	pub required: bool,
	#[serde(default, skip_serializing_if = "is_false")]
	pub read_only: bool,
	#[serde(default, skip_serializing_if = "is_false")]
	pub templated: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub regex: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<Number>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<Number>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_length: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_length: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step: Option<Number>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cols: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rows: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub templates: Option<IndexMap<String, FormTemplate>>,
	/// Extra members contributed by extension annotations
	#[serde(flatten)]
	pub extensions: IndexMap<String, Value>,
}

impl Property {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	/// Creates a property accepting a typed value
	pub fn typed(name: impl Into<String>, property_type: PropertyType) -> Self {
		Self {
			kind: Some(PropertyKind::Typed(property_type)),
			..Self::new(name)
		}
	}

	pub fn property_type(&self) -> Option<PropertyType> {
		match &self.kind {
			Some(PropertyKind::Typed(t)) => Some(*t),
			_ => None,
		}
	}

	pub fn options(&self) -> Option<&Options> {
		match &self.kind {
			Some(PropertyKind::Optioned(options)) => Some(options),
			_ => None,
		}
	}

	pub fn options_mut(&mut self) -> Option<&mut Options> {
		match &mut self.kind {
			Some(PropertyKind::Optioned(options)) => Some(options),
			_ => None,
		}
	}

	/// Makes the property typed, dropping any options
	pub fn set_type(&mut self, property_type: PropertyType) {
		self.kind = Some(PropertyKind::Typed(property_type));
	}

	/// Makes the property a choice, dropping any type
	pub fn set_options(&mut self, options: Options) {
		self.kind = Some(PropertyKind::Optioned(options));
	}

	pub fn clear_kind(&mut self) {
		self.kind = None;
	}

	pub fn is_type(&self, property_type: PropertyType) -> bool {
		self.property_type() == Some(property_type)
	}

	/// Nested template named [`DEFAULT_TEMPLATE`], or the only nested template
	pub fn default_template(&self) -> Option<&FormTemplate> {
		let templates = self.templates.as_ref()?;
		match templates.get(DEFAULT_TEMPLATE) {
			Some(template) => Some(template),
			None if templates.len() == 1 => templates.get_index(0).map(|(_, t)| t),
			None => None,
		}
	}
}

fn default_content_type() -> String {
	DEFAULT_CONTENT_TYPE.to_string()
}

fn default_method() -> String {
	DEFAULT_METHOD.to_string()
}

fn is_default_content_type(content_type: &String) -> bool {
	content_type == DEFAULT_CONTENT_TYPE
}

/// A HAL-Forms template: how to submit a state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplate {
	#[serde(default = "default_content_type", skip_serializing_if = "is_default_content_type")]
	pub content_type: String,
	#[serde(default = "default_method")]
	pub method: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default)]
	pub properties: Vec<Property>,
}

impl Default for FormTemplate {
	fn default() -> Self {
		Self {
			content_type: default_content_type(),
			method: default_method(),
			target: None,
			title: None,
			properties: Vec::new(),
		}
	}
}

impl FormTemplate {
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			..Default::default()
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = content_type.into();
		self
	}

	pub fn with_property(mut self, property: Property) -> Self {
		self.properties.push(property);
		self
	}

	pub fn property(&self, name: &str) -> Option<&Property> {
		self.properties.iter().find(|p| p.name == name)
	}

	pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
		self.properties.iter_mut().find(|p| p.name == name)
	}
}
