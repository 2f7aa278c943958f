//! State values under the member naming policy
//!
//! Writing goes through [`MemberSerializer`], a serde serializer producing a
//! [`Value`] in which every struct field, at any depth, is renamed by the
//! naming policy and left out under the ignore condition. Map keys are data
//! and keep their spelling below the top level. At the top level the state
//! members are flattened into the document, so map keys there are renamed
//! too and per-member ignore overrides apply.
//!
//! Reading goes through [`MemberDeserializer`], which re-keys the members of
//! every struct onto its declared field names before serde sees them.

use super::binding::rebind;
use super::options::SerializerOptions;
use crate::error::HalResult;
use crate::naming::NamingPolicy;
use serde::de::{self, DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, Visitor};
use serde::ser::{self, Serialize, Serializer};
use serde::forward_to_deserialize_any;
use serde_json::{Error, Map, Value};

/// Serializes a state value with member names and ignore conditions applied
///
/// # Examples
///
/// ```
/// use halforms_core::serialization::to_state_value;
/// use halforms_core::{IgnoreCondition, SerializerOptions};
/// use serde::Serialize;
/// use serde_json::json;
///
/// #[derive(Serialize)]
/// struct Line {
///     unit_price: f64,
///     note: Option<String>,
/// }
///
/// #[derive(Serialize)]
/// struct Order {
///     first_line: Line,
/// }
///
/// let order = Order { first_line: Line { unit_price: 1.5, note: None } };
/// let options = SerializerOptions::new().ignore_condition(IgnoreCondition::WhenNull);
/// let value = to_state_value(&order, &options).unwrap();
/// assert_eq!(value, json!({"firstLine": {"unitPrice": 1.5}}));
/// ```
pub fn to_state_value<T: Serialize + ?Sized>(state: &T, options: &SerializerOptions) -> HalResult<Value> {
	Ok(state.serialize(MemberSerializer { options, depth: 0 })?)
}

/// Deserializes a state value whose struct members may carry wire names
///
/// Members are matched exactly, then through `policy`, then ignoring case
/// and separators.
pub fn from_state_value<T: DeserializeOwned>(value: Value, policy: NamingPolicy) -> HalResult<T> {
	Ok(T::deserialize(MemberDeserializer { value, policy })?)
}

/// Map keys as serde_json writes them
fn member_key<T: Serialize + ?Sized>(key: &T) -> Result<String, Error> {
	match key.serialize(serde_json::value::Serializer)? {
		Value::String(key) => Ok(key),
		Value::Number(key) => Ok(key.to_string()),
		Value::Bool(key) => Ok(key.to_string()),
		_ => Err(ser::Error::custom("map keys must serialize to strings")),
	}
}

fn single_member(key: &str, value: Value) -> Value {
	let mut members = Map::with_capacity(1);
	members.insert(key.to_string(), value);
	Value::Object(members)
}

#[derive(Clone, Copy)]
pub(crate) struct MemberSerializer<'a> {
	options: &'a SerializerOptions,
	/// 0 for the state itself
	depth: usize,
}

impl MemberSerializer<'_> {
	fn child<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, Error> {
		value.serialize(MemberSerializer {
			options: self.options,
			depth: self.depth + 1,
		})
	}

	/// Wire name and keep decision of a struct field or top-level member
	fn member(&self, declared: &str, value: &Value) -> Option<String> {
		let condition = if self.depth == 0 {
			self.options.condition_for(declared)
		} else {
			self.options.ignore
		};
		(!condition.skips(value)).then(|| self.options.naming.apply(declared))
	}
}

macro_rules! forward_to_value_serializer {
	($($method:ident($ty:ty)),* $(,)?) => {
		$(
			fn $method(self, v: $ty) -> Result<Value, Error> {
				serde_json::value::Serializer.$method(v)
			}
		)*
	};
}

impl<'a> Serializer for MemberSerializer<'a> {
	type Ok = Value;
	type Error = Error;
	type SerializeSeq = Elements<'a>;
	type SerializeTuple = Elements<'a>;
	type SerializeTupleStruct = Elements<'a>;
	type SerializeTupleVariant = VariantElements<'a>;
	type SerializeMap = Entries<'a>;
	type SerializeStruct = Fields<'a>;
	type SerializeStructVariant = VariantFields<'a>;

	forward_to_value_serializer! {
		serialize_bool(bool),
		serialize_i8(i8),
		serialize_i16(i16),
		serialize_i32(i32),
		serialize_i64(i64),
		serialize_i128(i128),
		serialize_u8(u8),
		serialize_u16(u16),
		serialize_u32(u32),
		serialize_u64(u64),
		serialize_u128(u128),
		serialize_f32(f32),
		serialize_f64(f64),
		serialize_char(char),
		serialize_str(&str),
		serialize_bytes(&[u8]),
	}

	fn serialize_none(self) -> Result<Value, Error> {
		Ok(Value::Null)
	}

	fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, Error> {
		value.serialize(self)
	}

	fn serialize_unit(self) -> Result<Value, Error> {
		Ok(Value::Null)
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
		Ok(Value::Null)
	}

	fn serialize_unit_variant(
		self,
		_name: &'static str,
		_index: u32,
		variant: &'static str,
	) -> Result<Value, Error> {
		Ok(Value::String(variant.to_string()))
	}

	fn serialize_newtype_struct<T: Serialize + ?Sized>(
		self,
		_name: &'static str,
		value: &T,
	) -> Result<Value, Error> {
		value.serialize(self)
	}

	fn serialize_newtype_variant<T: Serialize + ?Sized>(
		self,
		_name: &'static str,
		_index: u32,
		variant: &'static str,
		value: &T,
	) -> Result<Value, Error> {
		Ok(single_member(variant, self.child(value)?))
	}

	fn serialize_seq(self, len: Option<usize>) -> Result<Elements<'a>, Error> {
		Ok(Elements {
			ser: self,
			items: Vec::with_capacity(len.unwrap_or(0)),
		})
	}

	fn serialize_tuple(self, len: usize) -> Result<Elements<'a>, Error> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Elements<'a>, Error> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_index: u32,
		variant: &'static str,
		len: usize,
	) -> Result<VariantElements<'a>, Error> {
		Ok(VariantElements {
			variant,
			elements: self.serialize_seq(Some(len))?,
		})
	}

	fn serialize_map(self, len: Option<usize>) -> Result<Entries<'a>, Error> {
		Ok(Entries {
			ser: self,
			members: Map::with_capacity(len.unwrap_or(0)),
			next_key: None,
		})
	}

	fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Fields<'a>, Error> {
		Ok(Fields {
			ser: self,
			members: Map::with_capacity(len),
		})
	}

	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_index: u32,
		variant: &'static str,
		len: usize,
	) -> Result<VariantFields<'a>, Error> {
		// the payload sits one level below the variant key
		let ser = MemberSerializer {
			options: self.options,
			depth: self.depth + 1,
		};
		Ok(VariantFields {
			variant,
			fields: ser.serialize_struct(variant, len)?,
		})
	}
}

pub(crate) struct Elements<'a> {
	ser: MemberSerializer<'a>,
	items: Vec<Value>,
}

impl ser::SerializeSeq for Elements<'_> {
	type Ok = Value;
	type Error = Error;

	fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
		self.items.push(self.ser.child(value)?);
		Ok(())
	}

	fn end(self) -> Result<Value, Error> {
		Ok(Value::Array(self.items))
	}
}

impl ser::SerializeTuple for Elements<'_> {
	type Ok = Value;
	type Error = Error;

	fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
		ser::SerializeSeq::serialize_element(self, value)
	}

	fn end(self) -> Result<Value, Error> {
		ser::SerializeSeq::end(self)
	}
}

impl ser::SerializeTupleStruct for Elements<'_> {
	type Ok = Value;
	type Error = Error;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
		ser::SerializeSeq::serialize_element(self, value)
	}

	fn end(self) -> Result<Value, Error> {
		ser::SerializeSeq::end(self)
	}
}

pub(crate) struct VariantElements<'a> {
	variant: &'static str,
	elements: Elements<'a>,
}

impl ser::SerializeTupleVariant for VariantElements<'_> {
	type Ok = Value;
	type Error = Error;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
		ser::SerializeSeq::serialize_element(&mut self.elements, value)
	}

	fn end(self) -> Result<Value, Error> {
		let elements = ser::SerializeSeq::end(self.elements)?;
		Ok(single_member(self.variant, elements))
	}
}

pub(crate) struct Entries<'a> {
	ser: MemberSerializer<'a>,
	members: Map<String, Value>,
	next_key: Option<String>,
}

impl ser::SerializeMap for Entries<'_> {
	type Ok = Value;
	type Error = Error;

	fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Error> {
		self.next_key = Some(member_key(key)?);
		Ok(())
	}

	fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
		let key = self
			.next_key
			.take()
			.ok_or_else(|| <Error as ser::Error>::custom("map value serialized before its key"))?;
		let value = self.ser.child(value)?;
		if self.ser.depth > 0 {
			self.members.insert(key, value);
		} else if let Some(name) = self.ser.member(&key, &value) {
			self.members.insert(name, value);
		}
		Ok(())
	}

	fn end(self) -> Result<Value, Error> {
		Ok(Value::Object(self.members))
	}
}

pub(crate) struct Fields<'a> {
	ser: MemberSerializer<'a>,
	members: Map<String, Value>,
}

impl ser::SerializeStruct for Fields<'_> {
	type Ok = Value;
	type Error = Error;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), Error> {
		let value = self.ser.child(value)?;
		if let Some(name) = self.ser.member(key, &value) {
			self.members.insert(name, value);
		}
		Ok(())
	}

	fn end(self) -> Result<Value, Error> {
		Ok(Value::Object(self.members))
	}
}

pub(crate) struct VariantFields<'a> {
	variant: &'static str,
	fields: Fields<'a>,
}

impl ser::SerializeStructVariant for VariantFields<'_> {
	type Ok = Value;
	type Error = Error;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), Error> {
		ser::SerializeStruct::serialize_field(&mut self.fields, key, value)
	}

	fn end(self) -> Result<Value, Error> {
		let fields = ser::SerializeStruct::end(self.fields)?;
		Ok(single_member(self.variant, fields))
	}
}

/// Deserializer over a state value that re-keys struct members
pub(crate) struct MemberDeserializer {
	value: Value,
	policy: NamingPolicy,
}

impl MemberDeserializer {
	fn new(value: Value, policy: NamingPolicy) -> Self {
		Self { value, policy }
	}
}

impl<'de> Deserializer<'de> for MemberDeserializer {
	type Error = Error;

	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		match self.value {
			Value::Array(items) => visitor.visit_seq(ElementsAccess {
				items: items.into_iter(),
				policy: self.policy,
			}),
			Value::Object(members) => visitor.visit_map(MembersAccess::new(members, self.policy)),
			other => other.deserialize_any(visitor),
		}
	}

	fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		match self.value {
			Value::Null => visitor.visit_none(),
			_ => visitor.visit_some(self),
		}
	}

	fn deserialize_newtype_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, Error> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Error> {
		match self.value {
			Value::Object(members) => {
				let members = rebind(members, fields, self.policy);
				visitor.visit_map(MembersAccess::new(members, self.policy))
			}
			other => MemberDeserializer::new(other, self.policy).deserialize_any(visitor),
		}
	}

	fn deserialize_enum<V: Visitor<'de>>(
		self,
		name: &'static str,
		variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Error> {
		match self.value {
			Value::String(variant) => visitor.visit_enum(VariantAccess {
				variant,
				content: None,
				policy: self.policy,
			}),
			Value::Object(members) if members.len() == 1 => match members.into_iter().next() {
				Some((variant, content)) => visitor.visit_enum(VariantAccess {
					variant,
					content: Some(content),
					policy: self.policy,
				}),
				None => Err(de::Error::invalid_length(0, &"one variant")),
			},
			other => other.deserialize_enum(name, variants, visitor),
		}
	}

	fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		visitor.visit_unit()
	}

	forward_to_deserialize_any! {
		bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
		bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
	}
}

struct ElementsAccess {
	items: std::vec::IntoIter<Value>,
	policy: NamingPolicy,
}

impl<'de> de::SeqAccess<'de> for ElementsAccess {
	type Error = Error;

	fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, Error> {
		self.items
			.next()
			.map(|item| seed.deserialize(MemberDeserializer::new(item, self.policy)))
			.transpose()
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.items.len())
	}
}

struct MembersAccess {
	members: serde_json::map::IntoIter,
	pending: Option<Value>,
	policy: NamingPolicy,
}

impl MembersAccess {
	fn new(members: Map<String, Value>, policy: NamingPolicy) -> Self {
		Self {
			members: members.into_iter(),
			pending: None,
			policy,
		}
	}
}

impl<'de> de::MapAccess<'de> for MembersAccess {
	type Error = Error;

	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
		match self.members.next() {
			Some((key, value)) => {
				self.pending = Some(value);
				seed.deserialize(KeyDeserializer { key }).map(Some)
			}
			None => Ok(None),
		}
	}

	fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
		match self.pending.take() {
			Some(value) => seed.deserialize(MemberDeserializer::new(value, self.policy)),
			None => Err(de::Error::custom("map value requested before its key")),
		}
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.members.len())
	}
}

/// Map keys, parsed back into numbers or booleans when the key type asks
struct KeyDeserializer {
	key: String,
}

macro_rules! parse_key {
	($($method:ident => $ty:ty => $visit:ident),* $(,)?) => {
		$(
			fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
				match self.key.parse::<$ty>() {
					Ok(parsed) => visitor.$visit(parsed),
					Err(_) => visitor.visit_string(self.key),
				}
			}
		)*
	};
}

impl<'de> Deserializer<'de> for KeyDeserializer {
	type Error = Error;

	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
		visitor.visit_string(self.key)
	}

	fn deserialize_newtype_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, Error> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Error> {
		visitor.visit_enum(self.key.into_deserializer())
	}

	parse_key! {
		deserialize_bool => bool => visit_bool,
		deserialize_i8 => i8 => visit_i8,
		deserialize_i16 => i16 => visit_i16,
		deserialize_i32 => i32 => visit_i32,
		deserialize_i64 => i64 => visit_i64,
		deserialize_u8 => u8 => visit_u8,
		deserialize_u16 => u16 => visit_u16,
		deserialize_u32 => u32 => visit_u32,
		deserialize_u64 => u64 => visit_u64,
		deserialize_f32 => f32 => visit_f32,
		deserialize_f64 => f64 => visit_f64,
	}

	forward_to_deserialize_any! {
		i128 u128 char str string bytes byte_buf option unit unit_struct seq
		tuple tuple_struct map struct identifier ignored_any
	}
}

/// An enum variant and its content, if any
struct VariantAccess {
	variant: String,
	content: Option<Value>,
	policy: NamingPolicy,
}

impl<'de> de::EnumAccess<'de> for VariantAccess {
	type Error = Error;
	type Variant = VariantContent;

	fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, VariantContent), Error> {
		let variant = seed.deserialize(KeyDeserializer { key: self.variant })?;
		Ok((
			variant,
			VariantContent {
				content: self.content,
				policy: self.policy,
			},
		))
	}
}

struct VariantContent {
	content: Option<Value>,
	policy: NamingPolicy,
}

impl VariantContent {
	fn content(self, expected: &str) -> Result<MemberDeserializer, Error> {
		match self.content {
			Some(content) => Ok(MemberDeserializer::new(content, self.policy)),
			None => Err(de::Error::invalid_type(de::Unexpected::UnitVariant, &expected)),
		}
	}
}

impl<'de> de::VariantAccess<'de> for VariantContent {
	type Error = Error;

	fn unit_variant(self) -> Result<(), Error> {
		match self.content {
			None | Some(Value::Null) => Ok(()),
			Some(_) => Err(de::Error::invalid_type(de::Unexpected::Map, &"unit variant")),
		}
	}

	fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Error> {
		seed.deserialize(self.content("newtype variant")?)
	}

	fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
		self.content("tuple variant")?.deserialize_seq(visitor)
	}

	fn struct_variant<V: Visitor<'de>>(
		self,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Error> {
		self.content("struct variant")?.deserialize_struct("", fields, visitor)
	}
}
