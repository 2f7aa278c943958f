//! Field annotations
//!
//! Annotations are the metadata attached to a [`FieldShape`](crate::FieldShape):
//! validation constraints, display hints, key and foreign-key markers and
//! custom extension data.

use halforms_core::{NamingPolicy, PromptDisplay};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Display metadata of a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Display {
	/// Label, becomes the property prompt
	pub name: Option<String>,
	/// Watermark text, becomes the property placeholder
	pub prompt: Option<String>,
	/// `Some(false)` drops the field from templates
	pub auto_generate: Option<bool>,
	pub order: Option<i32>,
}

impl Display {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Default::default()
		}
	}

	pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
		self.prompt = Some(prompt.into());
		self
	}

	pub fn with_order(mut self, order: i32) -> Self {
		self.order = Some(order);
		self
	}

	pub fn hidden_from_forms() -> Self {
		Self {
			auto_generate: Some(false),
			..Default::default()
		}
	}
}

/// Semantic data type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTypeHint {
	/// Free-form name; only names of known property types have an effect
	Custom(String),
	DateTime,
	Date,
	Time,
	Duration,
	PhoneNumber,
	Currency,
	Text,
	Html,
	MultilineText,
	EmailAddress,
	Password,
	Url,
	ImageUrl,
	CreditCard,
	PostalCode,
	/// File upload, optionally restricted to comma separated extensions
	Upload { extensions: Option<String> },
}

/// Data attached to a field and emitted verbatim under the property's
/// extensions.
pub trait ExtensionData: fmt::Debug + Send + Sync {
	/// Name of the extension, e.g. `IconAttribute` or `Icon`
	fn name(&self) -> &str;

	fn data(&self) -> Value;
}

/// Key an extension is emitted under: the name without an `Attribute`
/// suffix, passed through the naming policy.
///
/// # Examples
///
/// ```
/// use halforms_core::NamingPolicy;
/// use halforms_forms::annotations::extension_key;
///
/// assert_eq!(extension_key("IconHintAttribute", NamingPolicy::CamelCase), "iconHint");
/// assert_eq!(extension_key("Icon", NamingPolicy::CamelCase), "icon");
/// ```
pub fn extension_key(name: &str, naming: NamingPolicy) -> String {
	let trimmed = name
		.strip_suffix("Attribute")
		.filter(|rest| !rest.is_empty())
		.unwrap_or(name);
	naming.apply(trimmed)
}

/// One annotation of a field
#[derive(Debug, Clone)]
pub enum Annotation {
	/// Never part of a template
	Ignore,
	/// Not serialized, hence not part of a template
	JsonIgnore,
	/// `ScaffoldColumn(false)` drops the field from templates
	ScaffoldColumn(bool),
	Display(Display),
	DisplayName(String),
	DataType(DataTypeHint),
	/// Name of a property type to use instead of the inferred one
	UiHint(String),
	Editable(bool),
	Key,
	MaxLength(u64),
	MinLength(u64),
	StringLength { maximum: u64, minimum: Option<u64> },
	Length { minimum: u64, maximum: u64 },
	/// Bounds as written; unparseable bounds are ignored
	Range { minimum: String, maximum: String },
	RegularExpression(String),
	Required,
	Timestamp,
	ConcurrencyCheck,
	Step(f64),
	/// Name of the sibling field holding the referenced entity
	ForeignKey(String),
	PromptDisplay(PromptDisplay),
	Extension(Arc<dyn ExtensionData>),
}

/// Kind of an [`Annotation`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
	Ignore,
	JsonIgnore,
	ScaffoldColumn,
	Display,
	DisplayName,
	DataType,
	UiHint,
	Editable,
	Key,
	MaxLength,
	MinLength,
	StringLength,
	Length,
	Range,
	RegularExpression,
	Required,
	Timestamp,
	ConcurrencyCheck,
	Step,
	ForeignKey,
	PromptDisplay,
	Extension,
}

impl AnnotationKind {
	/// Kinds that change a property; the others only select or link fields
	pub const PROPERTY_RULES: [AnnotationKind; 18] = [
		AnnotationKind::DataType,
		AnnotationKind::ConcurrencyCheck,
		AnnotationKind::Display,
		AnnotationKind::DisplayName,
		AnnotationKind::PromptDisplay,
		AnnotationKind::Editable,
		AnnotationKind::Key,
		AnnotationKind::MaxLength,
		AnnotationKind::MinLength,
		AnnotationKind::StringLength,
		AnnotationKind::Length,
		AnnotationKind::Range,
		AnnotationKind::RegularExpression,
		AnnotationKind::Required,
		AnnotationKind::Timestamp,
		AnnotationKind::UiHint,
		AnnotationKind::Step,
		AnnotationKind::Extension,
	];
}

impl Annotation {
	pub fn kind(&self) -> AnnotationKind {
		match self {
			Annotation::Ignore => AnnotationKind::Ignore,
			Annotation::JsonIgnore => AnnotationKind::JsonIgnore,
			Annotation::ScaffoldColumn(_) => AnnotationKind::ScaffoldColumn,
			Annotation::Display(_) => AnnotationKind::Display,
			Annotation::DisplayName(_) => AnnotationKind::DisplayName,
			Annotation::DataType(_) => AnnotationKind::DataType,
			Annotation::UiHint(_) => AnnotationKind::UiHint,
			Annotation::Editable(_) => AnnotationKind::Editable,
			Annotation::Key => AnnotationKind::Key,
			Annotation::MaxLength(_) => AnnotationKind::MaxLength,
			Annotation::MinLength(_) => AnnotationKind::MinLength,
			Annotation::StringLength { .. } => AnnotationKind::StringLength,
			Annotation::Length { .. } => AnnotationKind::Length,
			Annotation::Range { .. } => AnnotationKind::Range,
			Annotation::RegularExpression(_) => AnnotationKind::RegularExpression,
			Annotation::Required => AnnotationKind::Required,
			Annotation::Timestamp => AnnotationKind::Timestamp,
			Annotation::ConcurrencyCheck => AnnotationKind::ConcurrencyCheck,
			Annotation::Step(_) => AnnotationKind::Step,
			Annotation::ForeignKey(_) => AnnotationKind::ForeignKey,
			Annotation::PromptDisplay(_) => AnnotationKind::PromptDisplay,
			Annotation::Extension(_) => AnnotationKind::Extension,
		}
	}

	/// True when the annotation keeps its field out of templates
	pub fn excludes_field(&self) -> bool {
		match self {
			Annotation::Ignore | Annotation::JsonIgnore => true,
			Annotation::ScaffoldColumn(scaffold) => !scaffold,
			Annotation::Display(display) => display.auto_generate == Some(false),
			_ => false,
		}
	}

	/// Creates a range annotation from numeric bounds
	pub fn range(minimum: impl ToString, maximum: impl ToString) -> Self {
		Annotation::Range {
			minimum: minimum.to_string(),
			maximum: maximum.to_string(),
		}
	}

	pub fn extension(data: impl ExtensionData + 'static) -> Self {
		Annotation::Extension(Arc::new(data))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Annotation::Ignore, true)]
	#[case(Annotation::JsonIgnore, true)]
	#[case(Annotation::ScaffoldColumn(false), true)]
	#[case(Annotation::ScaffoldColumn(true), false)]
	#[case(Annotation::Display(Display::hidden_from_forms()), true)]
	#[case(Annotation::Display(Display::named("Name")), false)]
	#[case(Annotation::Required, false)]
	fn test_excludes_field(#[case] annotation: Annotation, #[case] expected: bool) {
		assert_eq!(annotation.excludes_field(), expected);
	}

	#[rstest]
	#[case("HintAttribute", NamingPolicy::CamelCase, "hint")]
	#[case("Attribute", NamingPolicy::CamelCase, "attribute")]
	#[case("UiOrderAttribute", NamingPolicy::SnakeCase, "ui_order")]
	fn test_extension_key(#[case] name: &str, #[case] naming: NamingPolicy, #[case] expected: &str) {
		assert_eq!(extension_key(name, naming), expected);
	}

	#[rstest]
	fn test_property_rule_kinds_exclude_selectors() {
		for kind in [
			AnnotationKind::Ignore,
			AnnotationKind::JsonIgnore,
			AnnotationKind::ScaffoldColumn,
			AnnotationKind::ForeignKey,
		] {
			assert!(!AnnotationKind::PROPERTY_RULES.contains(&kind));
		}
	}
}
