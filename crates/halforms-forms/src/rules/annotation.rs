//! Built-in rules mapping annotations onto properties

use super::{FieldContext, PropertyRule};
use crate::annotations::{Annotation, AnnotationKind, DataTypeHint, extension_key};
use crate::error::FormsResult;
use halforms_core::{Property, PropertyType};
use serde_json::Number;

pub const EMAIL_REGEX: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";
pub const CREDIT_CARD_REGEX: &str = r"^(?:\d[ -]*?){13,19}$";

/// Applies every annotation of one kind found on a field
#[derive(Debug, Clone)]
pub struct AnnotationRule {
	kind: AnnotationKind,
	order: i32,
	name: String,
}

impl AnnotationRule {
	pub fn new(kind: AnnotationKind) -> Self {
		Self {
			kind,
			order: 0,
			name: Self::name_for(kind),
		}
	}

	pub fn with_order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}

	pub fn kind(&self) -> AnnotationKind {
		self.kind
	}

	pub(crate) fn name_for(kind: AnnotationKind) -> String {
		format!("annotation:{:?}", kind)
	}
}

impl PropertyRule for AnnotationRule {
	fn name(&self) -> &str {
		&self.name
	}

	fn order(&self) -> i32 {
		self.order
	}

	fn applies_to(&self, ctx: &FieldContext<'_>) -> bool {
		ctx.field.has(self.kind)
	}

	fn apply(&self, ctx: &FieldContext<'_>, property: &mut Property) -> FormsResult<()> {
		for annotation in ctx.field.annotations_of(self.kind) {
			apply_annotation(annotation, ctx, property);
		}
		Ok(())
	}
}

/// Overrides the type unless the property already is a choice
fn override_type(property: &mut Property, property_type: PropertyType) {
	if property.options().is_none() {
		property.set_type(property_type);
	}
}

fn apply_annotation(annotation: &Annotation, ctx: &FieldContext<'_>, property: &mut Property) {
	match annotation {
		Annotation::DataType(hint) => apply_data_type(hint, property),
		Annotation::Display(display) => {
			if let Some(name) = &display.name {
				property.prompt = Some(name.clone());
			}
			if let Some(prompt) = &display.prompt {
				property.placeholder = Some(prompt.clone());
			}
		}
		Annotation::DisplayName(name) => property.prompt = Some(name.clone()),
		Annotation::PromptDisplay(display) => property.prompt_display = Some(*display),
		Annotation::Editable(editable) => {
			if !editable {
				property.read_only = true;
			}
		}
		Annotation::Key => {
			property.read_only = true;
			property.required = true;
		}
		Annotation::MaxLength(length) => property.max_length = Some(*length),
		Annotation::MinLength(length) => property.min_length = Some(*length),
		Annotation::StringLength { maximum, minimum } => {
			property.max_length = Some(*maximum);
			// an explicit minimum lands in both bounds
			if let Some(minimum) = minimum {
				property.min_length = Some(*minimum);
				property.max_length = Some(*minimum);
			}
		}
		Annotation::Length { minimum, maximum } => {
			property.min_length = Some(*minimum);
			property.max_length = Some(*maximum);
		}
		Annotation::Range { minimum, maximum } => {
			if let Some(min) = parse_bound(minimum) {
				property.min = Some(min);
			}
			if let Some(max) = parse_bound(maximum) {
				property.max = Some(max);
			}
		}
		Annotation::RegularExpression(pattern) => property.regex = Some(pattern.clone()),
		Annotation::Required => property.required = true,
		Annotation::Timestamp | Annotation::ConcurrencyCheck => property.set_type(PropertyType::Hidden),
		Annotation::UiHint(hint) => match hint.parse::<PropertyType>() {
			Ok(property_type) => override_type(property, property_type),
			Err(_) => tracing::warn!(field = %ctx.field.name, %hint, "Ignoring unknown UI hint"),
		},
		Annotation::Step(step) => {
			if let Some(step) = Number::from_f64(*step) {
				property.step = Some(step);
			}
		}
		Annotation::Extension(extension) => {
			property
				.extensions
				.insert(extension_key(extension.name(), ctx.naming), extension.data());
		}
		Annotation::Ignore
		| Annotation::JsonIgnore
		| Annotation::ScaffoldColumn(_)
		| Annotation::ForeignKey(_) => {}
	}
}

fn parse_bound(bound: &str) -> Option<Number> {
	bound.trim().parse::<f64>().ok().and_then(Number::from_f64)
}

fn apply_data_type(hint: &DataTypeHint, property: &mut Property) {
	let property_type = match hint {
		DataTypeHint::Custom(name) => match name.parse::<PropertyType>() {
			Ok(property_type) => property_type,
			Err(_) => {
				tracing::warn!(%name, "Ignoring unknown custom data type");
				return;
			}
		},
		DataTypeHint::DateTime => PropertyType::DatetimeLocal,
		DataTypeHint::Date => PropertyType::Date,
		DataTypeHint::Time => PropertyType::Time,
		DataTypeHint::Duration => PropertyType::Duration,
		DataTypeHint::PhoneNumber => PropertyType::Tel,
		DataTypeHint::Currency => PropertyType::Currency,
		DataTypeHint::Text | DataTypeHint::PostalCode => PropertyType::Text,
		DataTypeHint::Html | DataTypeHint::MultilineText => PropertyType::Textarea,
		DataTypeHint::EmailAddress => {
			property.regex = Some(EMAIL_REGEX.to_string());
			PropertyType::Email
		}
		DataTypeHint::Password => PropertyType::Password,
		DataTypeHint::Url => PropertyType::Url,
		DataTypeHint::ImageUrl => PropertyType::Image,
		DataTypeHint::CreditCard => {
			property.regex = Some(CREDIT_CARD_REGEX.to_string());
			PropertyType::Text
		}
		DataTypeHint::Upload { extensions } => {
			if let Some(extensions) = extensions {
				property.placeholder = Some(extensions.clone());
			}
			PropertyType::File
		}
	};
	override_type(property, property_type);
}
