//! Binding of a dynamic state bag to a typed state
//!
//! Strategies, in order:
//!
//! 1. registered constructors, widest first; arguments are looked up by
//!    parameter name ignoring case and separators, and a failing constructor
//!    hands over to the next one;
//! 2. keys no constructor argument consumed are applied to the constructed
//!    value as setters;
//! 3. when no constructor succeeds, the bag is re-keyed onto the type's
//!    declared field names and bound with serde; nested structs are
//!    re-keyed the same way.
//!
//! Keys that match nothing are ignored.

use super::members::from_state_value;
use crate::error::{HalError, HalResult};
use crate::naming::{NamingPolicy, find_key, normalize_key};
use crate::resource::DynamicState;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Serialize, forward_to_deserialize_any};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

type Build<S> = dyn Fn(&DynamicState) -> Result<S, String> + Send + Sync;

struct Constructor<S> {
	params: Vec<String>,
	build: Arc<Build<S>>,
}

impl<S> Clone for Constructor<S> {
	fn clone(&self) -> Self {
		Self {
			params: self.params.clone(),
			build: Arc::clone(&self.build),
		}
	}
}

/// Binds state bags to `S`
///
/// # Examples
///
/// ```
/// use halforms_core::{NamingPolicy, StateBinder};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Serialize, Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let binder = StateBinder::<Person>::new().constructor(&["name"], |args| {
///     let name = args["name"].as_str().ok_or("name must be a string")?;
///     Ok(Person { name: name.to_string(), age: 0 })
/// });
///
/// let bag = json!({"NAME": "Ada", "Age": 36});
/// let person = binder
///     .bind(bag.as_object().unwrap().clone(), NamingPolicy::CamelCase)
///     .unwrap()
///     .unwrap();
/// assert_eq!(person.name, "Ada");
/// assert_eq!(person.age, 36);
/// ```
pub struct StateBinder<S> {
	constructors: Vec<Constructor<S>>,
}

impl<S> Default for StateBinder<S> {
	fn default() -> Self {
		Self {
			constructors: Vec::new(),
		}
	}
}

impl<S> Clone for StateBinder<S> {
	fn clone(&self) -> Self {
		Self {
			constructors: self.constructors.clone(),
		}
	}
}

impl<S> fmt::Debug for StateBinder<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StateBinder")
			.field("type", &std::any::type_name::<S>())
			.field(
				"constructors",
				&self.constructors.iter().map(|c| &c.params).collect::<Vec<_>>(),
			)
			.finish()
	}
}

impl<S> StateBinder<S>
where
	S: Serialize + DeserializeOwned,
{
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a constructor taking the named parameters
	///
	/// `build` receives the matched arguments keyed by parameter name. A
	/// parameter with no matching key is absent from the argument map.
	pub fn constructor<F>(mut self, params: &[&str], build: F) -> Self
	where
		F: Fn(&DynamicState) -> Result<S, String> + Send + Sync + 'static,
	{
		self.constructors.push(Constructor {
			params: params.iter().map(|p| p.to_string()).collect(),
			build: Arc::new(build),
		});
		// Stable: equally wide constructors keep registration order
		self.constructors
			.sort_by(|a, b| b.params.len().cmp(&a.params.len()));
		self
	}

	/// Binds a bag to `S`
	///
	/// Returns `Ok(None)` when the bag is empty and nothing could be bound.
	pub fn bind(&self, bag: DynamicState, policy: NamingPolicy) -> HalResult<Option<S>> {
		let fields = struct_fields::<S>();

		for constructor in &self.constructors {
			match self.try_constructor(constructor, &bag, fields, policy) {
				Ok(state) => return Ok(Some(state)),
				Err(reason) => {
					tracing::debug!(
						state_type = std::any::type_name::<S>(),
						params = ?constructor.params,
						%reason,
						"Constructor binding failed, trying next strategy"
					);
				}
			}
		}

		let was_empty = bag.is_empty();
		let rebound = rebind(bag, fields, policy);
		match from_state_value::<S>(Value::Object(rebound), policy) {
			Ok(state) => Ok(Some(state)),
			Err(_) if was_empty => Ok(None),
			Err(e) => Err(HalError::binding::<S>(e.to_string())),
		}
	}

	fn try_constructor(
		&self,
		constructor: &Constructor<S>,
		bag: &DynamicState,
		fields: &[&str],
		policy: NamingPolicy,
	) -> Result<S, String> {
		let mut args = DynamicState::new();
		let mut consumed = HashSet::new();
		for param in &constructor.params {
			if let Some(key) = find_key(bag.keys(), param, policy) {
				args.insert(param.clone(), bag[key].clone());
				consumed.insert(key.to_string());
			}
		}
		let state = (constructor.build)(&args)?;

		let leftovers: DynamicState = bag
			.iter()
			.filter(|(k, _)| !consumed.contains(k.as_str()))
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect();
		if leftovers.is_empty() || fields.is_empty() {
			return Ok(state);
		}
		apply_setters(state, leftovers, fields, policy)
	}
}

/// Overlays leftover keys onto the declared fields of an already built value
fn apply_setters<S>(
	state: S,
	leftovers: DynamicState,
	fields: &[&str],
	policy: NamingPolicy,
) -> Result<S, String>
where
	S: Serialize + DeserializeOwned,
{
	let mut current = match serde_json::to_value(&state) {
		Ok(Value::Object(members)) => members,
		_ => return Ok(state),
	};
	let mut changed = false;
	for (key, value) in leftovers {
		match declared_field(&key, fields, policy) {
			Some(field) => {
				current.insert(field.to_string(), value);
				changed = true;
			}
			None => tracing::trace!(%key, "Ignoring state member without a matching field"),
		}
	}
	if !changed {
		return Ok(state);
	}
	from_state_value(Value::Object(current), policy).map_err(|e| e.to_string())
}

/// Declared field designated by a wire key
fn declared_field<'a>(key: &str, fields: &[&'a str], policy: NamingPolicy) -> Option<&'a str> {
	if let Some(exact) = fields.iter().copied().find(|f| *f == key) {
		return Some(exact);
	}
	if let Some(renamed) = fields.iter().copied().find(|f| policy.apply(f) == key) {
		return Some(renamed);
	}
	let normalized = normalize_key(key);
	fields.iter().copied().find(|f| normalize_key(f) == normalized)
}

/// Re-keys a bag onto declared field names; exact keys win over lenient ones
pub(super) fn rebind(bag: DynamicState, fields: &[&str], policy: NamingPolicy) -> Map<String, Value> {
	if fields.is_empty() {
		return bag;
	}
	let mut rebound = Map::with_capacity(bag.len());
	let mut lenient = Vec::new();
	for (key, value) in bag {
		if fields.contains(&key.as_str()) {
			rebound.insert(key, value);
		} else {
			lenient.push((key, value));
		}
	}
	for (key, value) in lenient {
		match declared_field(&key, fields, policy) {
			Some(field) if !rebound.contains_key(field) => {
				rebound.insert(field.to_string(), value);
			}
			_ => tracing::trace!(%key, "Ignoring state member without a matching field"),
		}
	}
	rebound
}

/// Declared field names of a struct deserialized by serde, empty for
/// anything that is not a plain struct.
pub fn struct_fields<S: DeserializeOwned>() -> &'static [&'static str] {
	let mut fields: &'static [&'static str] = &[];
	let _ = S::deserialize(FieldCollector {
		fields: &mut fields,
	});
	fields
}

/// Deserializer that records the field list a struct asks for and then bails
struct FieldCollector<'a> {
	fields: &'a mut &'static [&'static str],
}

impl<'de> Deserializer<'de> for FieldCollector<'_> {
	type Error = de::value::Error;

	fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
		Err(de::Error::custom("not a struct"))
	}

	fn deserialize_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		fields: &'static [&'static str],
		_visitor: V,
	) -> Result<V::Value, Self::Error> {
		*self.fields = fields;
		Err(de::Error::custom("fields collected"))
	}

	forward_to_deserialize_any! {
		bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
		bytes byte_buf option unit unit_struct newtype_struct seq tuple
		tuple_struct map enum identifier ignored_any
	}
}
