//! Property type inference from declared field types

use crate::shape::{EnumShape, FloatKind, IntKind, ShapeRef, TypeRef};
use halforms_core::{InlineOption, Options, Property, PropertyType};
use serde_json::Number;

pub const SIGNED_REQUIRED_REGEX: &str = r"^(\+|-)?\d+$";
pub const SIGNED_OPTIONAL_REGEX: &str = r"^(\+|-)?\d*$";
pub const UNSIGNED_REQUIRED_REGEX: &str = r"^(\+)?\d+$";
pub const UNSIGNED_OPTIONAL_REGEX: &str = r"^(\+)?\d*$";
pub const DECIMAL_REGEX: &str = r"^[-+]?\d*\.?\d*$";

/// Nested template a property needs, decided by its type
#[derive(Debug, Clone, PartialEq)]
pub enum NestedShape {
	/// Template of a registered object
	Object(ShapeRef),
	/// Template of a list element
	Element(TypeRef),
	/// Template of one map entry
	KeyValue { key: TypeRef, value: TypeRef },
}

/// Outcome of inference for one field
#[derive(Debug, Clone)]
pub struct Inference {
	pub property: Property,
	pub nested: Option<NestedShape>,
}

/// Infers type and constraints of a property named `name` holding `ty`
///
/// # Examples
///
/// ```
/// use halforms_core::PropertyType;
/// use halforms_forms::TypeRef;
/// use halforms_forms::inference::infer_property;
///
/// let inferred = infer_property("Id", &TypeRef::of::<u16>());
/// let property = inferred.property;
/// assert_eq!(property.property_type(), Some(PropertyType::Number));
/// assert!(property.required);
/// assert!(property.read_only);
/// assert_eq!(property.max.unwrap().as_u64(), Some(65535));
/// ```
pub fn infer_property(name: &str, ty: &TypeRef) -> Inference {
	let required = !ty.is_optional();
	let mut property = Property {
		required,
		..Property::new(name)
	};
	let mut nested = None;

	match ty.non_optional() {
		TypeRef::String => property.set_type(PropertyType::Text),
		TypeRef::Bool => property.set_type(PropertyType::Bool),
		TypeRef::Enum(shape) => property.set_options(enum_options(shape, required)),
		TypeRef::Int(kind) => apply_integer(&mut property, *kind),
		TypeRef::Char => {
			property.set_type(PropertyType::Text);
			property.min_length = Some(u64::from(required));
			property.max_length = Some(1);
		}
		TypeRef::Float(kind) => apply_float(&mut property, *kind),
		TypeRef::Date => property.set_type(PropertyType::Date),
		TypeRef::DateTime => property.set_type(PropertyType::DatetimeLocal),
		TypeRef::DateTimeOffset => property.set_type(PropertyType::DatetimeOffset),
		TypeRef::Time => property.set_type(PropertyType::Time),
		TypeRef::Duration => property.set_type(PropertyType::Duration),
		TypeRef::File => property.set_type(PropertyType::File),
		_ if ty.is_byte_array() && name.eq_ignore_ascii_case("timestamp") => {
			property.set_type(PropertyType::Hidden)
		}
		TypeRef::Map(key, value) => {
			property.set_type(PropertyType::Collection);
			nested = Some(NestedShape::KeyValue {
				key: (**key).clone(),
				value: (**value).clone(),
			});
		}
		TypeRef::List(element) => {
			property.set_type(PropertyType::Collection);
			nested = Some(match element.non_optional() {
				TypeRef::Object(shape) => NestedShape::Object(*shape),
				_ => NestedShape::Element((**element).clone()),
			});
		}
		TypeRef::Object(shape) => {
			property.set_type(PropertyType::Object);
			nested = Some(NestedShape::Object(*shape));
		}
		TypeRef::Optional(_) => {}
	}

	if name.eq_ignore_ascii_case("id") {
		property.read_only = true;
	}

	Inference { property, nested }
}

/// Inline options listing the members of an enumeration
pub fn enum_options(shape: &EnumShape, required: bool) -> Options {
	Options {
		min_items: Some(u64::from(required)),
		max_items: if shape.flags { None } else { Some(1) },
		..Options::inline(
			shape
				.members
				.iter()
				.map(|m| InlineOption::new(m.name.clone(), m.value))
				.collect(),
		)
	}
}

fn apply_integer(property: &mut Property, kind: IntKind) {
	property.set_type(PropertyType::Number);
	property.min = Some(kind.min());
	property.max = Some(kind.max());
	property.step = Some(Number::from(1));
	let regex = match (kind.is_signed(), property.required) {
		(true, true) => SIGNED_REQUIRED_REGEX,
		(true, false) => SIGNED_OPTIONAL_REGEX,
		(false, true) => UNSIGNED_REQUIRED_REGEX,
		(false, false) => UNSIGNED_OPTIONAL_REGEX,
	};
	property.regex = Some(regex.to_string());
}

fn apply_float(property: &mut Property, kind: FloatKind) {
	property.set_type(PropertyType::Number);
	property.min = kind.min();
	property.max = kind.max();
	property.step = Number::from_f64(0.01);
	property.regex = Some(DECIMAL_REGEX.to_string());
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::shape::{Dto, FieldShape, TypeShape};
	use rstest::rstest;
	use serde_json::json;
	use std::collections::HashMap;

	struct Address;

	impl Dto for Address {
		fn shape() -> TypeShape {
			TypeShape::new("Address").field(FieldShape::of::<String>("street"))
		}
	}

	fn infer(name: &str, ty: TypeRef) -> Property {
		infer_property(name, &ty).property
	}

	#[rstest]
	#[case(TypeRef::of::<String>(), PropertyType::Text)]
	#[case(TypeRef::of::<Option<bool>>(), PropertyType::Bool)]
	#[case(TypeRef::of::<chrono::NaiveDate>(), PropertyType::Date)]
	#[case(TypeRef::of::<chrono::NaiveDateTime>(), PropertyType::DatetimeLocal)]
	#[case(TypeRef::of::<chrono::DateTime<chrono::Utc>>(), PropertyType::DatetimeOffset)]
	#[case(TypeRef::of::<chrono::NaiveTime>(), PropertyType::Time)]
	#[case(TypeRef::of::<std::time::Duration>(), PropertyType::Duration)]
	#[case(TypeRef::File, PropertyType::File)]
	#[case(TypeRef::of::<Vec<String>>(), PropertyType::Collection)]
	#[case(TypeRef::object::<Address>(), PropertyType::Object)]
	fn test_type_mapping(#[case] ty: TypeRef, #[case] expected: PropertyType) {
		assert_eq!(infer("field", ty).property_type(), Some(expected));
	}

	#[rstest]
	#[case(TypeRef::of::<i32>(), SIGNED_REQUIRED_REGEX)]
	#[case(TypeRef::of::<Option<i64>>(), SIGNED_OPTIONAL_REGEX)]
	#[case(TypeRef::of::<u8>(), UNSIGNED_REQUIRED_REGEX)]
	#[case(TypeRef::of::<Option<u32>>(), UNSIGNED_OPTIONAL_REGEX)]
	fn test_integer_regex(#[case] ty: TypeRef, #[case] expected: &str) {
		let property = infer("count", ty);
		assert_eq!(property.regex.as_deref(), Some(expected));
		assert_eq!(property.step, Some(Number::from(1)));
	}

	#[rstest]
	fn test_optional_is_not_required() {
		assert!(infer("a", TypeRef::of::<i32>()).required);
		assert!(!infer("a", TypeRef::of::<Option<i32>>()).required);
	}

	#[rstest]
	fn test_char_lengths() {
		let required = infer("initial", TypeRef::of::<char>());
		assert_eq!((required.min_length, required.max_length), (Some(1), Some(1)));
		let optional = infer("initial", TypeRef::of::<Option<char>>());
		assert_eq!((optional.min_length, optional.max_length), (Some(0), Some(1)));
	}

	#[rstest]
	fn test_decimal_bounds() {
		let property = infer("price", TypeRef::Float(FloatKind::Decimal));
		assert_eq!(property.step, Number::from_f64(0.01));
		assert_eq!(property.max.unwrap().as_f64(), Some(crate::shape::DECIMAL_MAX));
		assert_eq!(property.regex.as_deref(), Some(DECIMAL_REGEX));
	}

	#[rstest]
	fn test_enum_options() {
		let shape = EnumShape::new("Color")
			.member("Red", 0)
			.member("Green", 1)
			.member("Blue", 2);
		let property = infer("color", TypeRef::Enum(shape.clone()));
		assert_eq!(property.property_type(), None);
		let options = property.options().unwrap();
		assert_eq!(options.inline.len(), 3);
		assert_eq!(options.inline[2].value, json!(2));
		assert_eq!((options.min_items, options.max_items), (Some(1), Some(1)));

		let nullable = infer("color", TypeRef::optional(TypeRef::Enum(shape.flags())));
		let options = nullable.options().unwrap();
		assert_eq!((options.min_items, options.max_items), (Some(0), None));
	}

	#[rstest]
	#[case("timestamp", PropertyType::Hidden)]
	#[case("RowTimestamp", PropertyType::Collection)]
	fn test_timestamp_byte_array(#[case] name: &str, #[case] expected: PropertyType) {
		let property = infer(name, TypeRef::of::<Vec<u8>>());
		assert_eq!(property.property_type(), Some(expected));
	}

	#[rstest]
	fn test_nested_shapes() {
		let list = infer_property("addresses", &TypeRef::list(TypeRef::object::<Address>()));
		assert_eq!(list.nested, Some(NestedShape::Object(crate::shape::ShapeRef::of::<Address>())));

		let map = infer_property("scores", &TypeRef::of::<HashMap<String, i32>>());
		assert!(matches!(map.nested, Some(NestedShape::KeyValue { .. })));

		let tags = infer_property("tags", &TypeRef::of::<Vec<String>>());
		assert_eq!(tags.nested, Some(NestedShape::Element(TypeRef::String)));
	}

	#[rstest]
	#[case("id", true)]
	#[case("ID", true)]
	#[case("userId", false)]
	fn test_id_is_read_only(#[case] name: &str, #[case] expected: bool) {
		assert_eq!(infer(name, TypeRef::of::<i64>()).read_only, expected);
	}
}
