//! Registered type shapes
//!
//! Template synthesis walks a [`TypeShape`]: the declared fields of a DTO,
//! their types and annotations. Hosts register a shape per DTO by
//! implementing [`Dto`], usually next to the type's serde derives:
//!
//! ```
//! use halforms_forms::{Dto, FieldShape, TypeShape};
//!
//! struct Category {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl Dto for Category {
//!     fn shape() -> TypeShape {
//!         TypeShape::new("Category")
//!             .field(FieldShape::of::<i32>("id"))
//!             .field(FieldShape::of::<String>("name"))
//!     }
//! }
//!
//! assert_eq!(Category::shape().fields.len(), 2);
//! ```

use crate::annotations::{Annotation, AnnotationKind, Display};
use halforms_core::PromptDisplay;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type with a registered shape
pub trait Dto: 'static {
	fn shape() -> TypeShape;
}

/// An enumeration with registered members
pub trait DtoEnum: 'static {
	fn enum_shape() -> EnumShape;
}

/// Maps a Rust type to the [`TypeRef`] synthesis understands
pub trait Describe {
	fn type_ref() -> TypeRef;
}

/// Handle to a registered shape, identified by its Rust type
#[derive(Clone, Copy)]
pub struct ShapeRef {
	id: TypeId,
	name: &'static str,
	build: fn() -> TypeShape,
}

impl ShapeRef {
	pub fn of<T: Dto>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
			build: T::shape,
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Rust type name of the shape's type
	pub fn type_name(&self) -> &'static str {
		self.name
	}

	/// Builds the shape
	pub fn shape(&self) -> TypeShape {
		(self.build)()
	}
}

impl PartialEq for ShapeRef {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for ShapeRef {}

impl Hash for ShapeRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for ShapeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ShapeRef").field(&self.name).finish()
	}
}

/// Integer widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	U64,
}

impl IntKind {
	pub fn is_signed(&self) -> bool {
		matches!(self, IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64)
	}

	/// Smallest representable value
	pub fn min(&self) -> Number {
		match self {
			IntKind::I8 => i8::MIN.into(),
			IntKind::I16 => i16::MIN.into(),
			IntKind::I32 => i32::MIN.into(),
			IntKind::I64 => i64::MIN.into(),
			IntKind::U8 | IntKind::U16 | IntKind::U32 | IntKind::U64 => 0u64.into(),
		}
	}

	/// Largest representable value
	pub fn max(&self) -> Number {
		match self {
			IntKind::I8 => i8::MAX.into(),
			IntKind::I16 => i16::MAX.into(),
			IntKind::I32 => i32::MAX.into(),
			IntKind::I64 => i64::MAX.into(),
			IntKind::U8 => u8::MAX.into(),
			IntKind::U16 => u16::MAX.into(),
			IntKind::U32 => u32::MAX.into(),
			IntKind::U64 => u64::MAX.into(),
		}
	}
}

/// Largest magnitude of a 96-bit decimal
pub const DECIMAL_MAX: f64 = 79_228_162_514_264_337_593_543_950_335.0;

/// Floating point and decimal widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
	F32,
	F64,
	Decimal,
}

impl FloatKind {
	fn bound(&self) -> f64 {
		match self {
			FloatKind::F32 => f32::MAX as f64,
			FloatKind::F64 => f64::MAX,
			FloatKind::Decimal => DECIMAL_MAX,
		}
	}

	pub fn min(&self) -> Option<Number> {
		Number::from_f64(-self.bound())
	}

	pub fn max(&self) -> Option<Number> {
		Number::from_f64(self.bound())
	}
}

/// One member of an enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
	pub name: String,
	pub value: i64,
}

/// Members of an enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumShape {
	pub name: String,
	/// Members combine as bit flags
	pub flags: bool,
	pub members: Vec<EnumMember>,
}

impl EnumShape {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			flags: false,
			members: Vec::new(),
		}
	}

	pub fn flags(mut self) -> Self {
		self.flags = true;
		self
	}

	pub fn member(mut self, name: impl Into<String>, value: i64) -> Self {
		self.members.push(EnumMember {
			name: name.into(),
			value,
		});
		self
	}
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
	String,
	Bool,
	Char,
	Int(IntKind),
	Float(FloatKind),
	Date,
	DateTime,
	DateTimeOffset,
	Time,
	Duration,
	File,
	Enum(EnumShape),
	Optional(Box<TypeRef>),
	List(Box<TypeRef>),
	Map(Box<TypeRef>, Box<TypeRef>),
	Object(ShapeRef),
}

impl TypeRef {
	pub fn of<T: Describe>() -> Self {
		T::type_ref()
	}

	pub fn object<T: Dto>() -> Self {
		TypeRef::Object(ShapeRef::of::<T>())
	}

	pub fn enumeration<E: DtoEnum>() -> Self {
		TypeRef::Enum(E::enum_shape())
	}

	pub fn optional(inner: TypeRef) -> Self {
		match inner {
			optional @ TypeRef::Optional(_) => optional,
			other => TypeRef::Optional(Box::new(other)),
		}
	}

	pub fn list(element: TypeRef) -> Self {
		TypeRef::List(Box::new(element))
	}

	pub fn map(key: TypeRef, value: TypeRef) -> Self {
		TypeRef::Map(Box::new(key), Box::new(value))
	}

	pub fn is_optional(&self) -> bool {
		matches!(self, TypeRef::Optional(_))
	}

	/// The type without any optional wrapper
	pub fn non_optional(&self) -> &TypeRef {
		let mut ty = self;
		while let TypeRef::Optional(inner) = ty {
			ty = inner;
		}
		ty
	}

	/// True for sequences and maps
	pub fn is_enumerable(&self) -> bool {
		matches!(self.non_optional(), TypeRef::List(_) | TypeRef::Map(_, _))
	}

	/// `Vec<u8>` and friends
	pub fn is_byte_array(&self) -> bool {
		match self.non_optional() {
			TypeRef::List(element) => **element == TypeRef::Int(IntKind::U8),
			_ => false,
		}
	}

	/// Referenced shape of an object, a list of objects or an optional of either
	pub fn referenced_shape(&self) -> Option<ShapeRef> {
		match self.non_optional() {
			TypeRef::Object(shape) => Some(*shape),
			TypeRef::List(element) => match element.non_optional() {
				TypeRef::Object(shape) => Some(*shape),
				_ => None,
			},
			_ => None,
		}
	}
}

/// Builds the JSON representation of a default instance
pub type DefaultFactory = Arc<dyn Fn() -> Result<Value, String> + Send + Sync>;

/// Registered shape of a DTO
#[derive(Clone)]
pub struct TypeShape {
	pub name: String,
	/// Own fields in declaration order
	pub fields: Vec<FieldShape>,
	/// Shape whose fields this one inherits
	pub base: Option<ShapeRef>,
	/// Field used as the prompt of foreign-key options
	pub display_column: Option<String>,
	default_instance: Option<DefaultFactory>,
}

impl fmt::Debug for TypeShape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeShape")
			.field("name", &self.name)
			.field("fields", &self.fields)
			.field("base", &self.base)
			.field("display_column", &self.display_column)
			.field("default_instance", &self.default_instance.is_some())
			.finish()
	}
}

impl TypeShape {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: Vec::new(),
			base: None,
			display_column: None,
			default_instance: None,
		}
	}

	pub fn field(mut self, field: FieldShape) -> Self {
		self.fields.push(field);
		self
	}

	/// Inherits the fields of `B`, placed after the own fields
	pub fn extends<B: Dto>(mut self) -> Self {
		self.base = Some(ShapeRef::of::<B>());
		self
	}

	pub fn display_column(mut self, field: impl Into<String>) -> Self {
		self.display_column = Some(field.into());
		self
	}

	/// Uses `T::default()` as the default instance of the shape
	pub fn with_default<T: Default + Serialize>(self) -> Self {
		self.with_default_factory(|| serde_json::to_value(T::default()).map_err(|e| e.to_string()))
	}

	/// Uses a fallible factory as the default instance of the shape
	pub fn with_default_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> Result<Value, String> + Send + Sync + 'static,
	{
		self.default_instance = Some(Arc::new(factory));
		self
	}

	/// Builds the default instance, `None` when the shape has no factory
	pub fn default_instance(&self) -> Option<Result<Value, String>> {
		self.default_instance.as_ref().map(|factory| factory())
	}

	/// Fields of the base chain, nearest base first
	pub fn inherited_fields(&self) -> Vec<FieldShape> {
		let mut fields = Vec::new();
		let mut seen = Vec::new();
		let mut next = self.base;
		while let Some(base) = next {
			// a base chain that loops back on itself ends here
			if seen.contains(&base.id()) {
				break;
			}
			seen.push(base.id());
			let shape = base.shape();
			fields.extend(shape.fields);
			next = shape.base;
		}
		fields
	}

	/// Own fields followed by inherited ones
	pub fn all_fields(&self) -> Vec<FieldShape> {
		let mut fields = self.fields.clone();
		fields.extend(self.inherited_fields());
		fields
	}

	/// Finds a field by name, exact first then ignoring case and separators
	pub fn find_field(&self, name: &str) -> Option<FieldShape> {
		let fields = self.all_fields();
		if let Some(exact) = fields.iter().find(|f| f.name == name) {
			return Some(exact.clone());
		}
		let normalized = halforms_core::naming::normalize_key(name);
		fields
			.into_iter()
			.find(|f| halforms_core::naming::normalize_key(&f.name) == normalized)
	}
}

/// A declared field
#[derive(Debug, Clone)]
pub struct FieldShape {
	/// Declared name, the one serde reads and writes
	pub name: String,
	pub ty: TypeRef,
	pub annotations: Vec<Annotation>,
}

impl FieldShape {
	pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
		Self {
			name: name.into(),
			ty,
			annotations: Vec::new(),
		}
	}

	pub fn of<T: Describe>(name: impl Into<String>) -> Self {
		Self::new(name, T::type_ref())
	}

	pub fn object<T: Dto>(name: impl Into<String>) -> Self {
		Self::new(name, TypeRef::object::<T>())
	}

	pub fn enumeration<E: DtoEnum>(name: impl Into<String>) -> Self {
		Self::new(name, TypeRef::enumeration::<E>())
	}

	pub fn annotate(mut self, annotation: Annotation) -> Self {
		self.annotations.push(annotation);
		self
	}

	pub fn required(self) -> Self {
		self.annotate(Annotation::Required)
	}

	pub fn key(self) -> Self {
		self.annotate(Annotation::Key)
	}

	pub fn ignore(self) -> Self {
		self.annotate(Annotation::Ignore)
	}

	pub fn prompt(self, prompt: impl Into<String>) -> Self {
		self.annotate(Annotation::DisplayName(prompt.into()))
	}

	pub fn display(self, display: Display) -> Self {
		self.annotate(Annotation::Display(display))
	}

	pub fn prompt_display(self, display: PromptDisplay) -> Self {
		self.annotate(Annotation::PromptDisplay(display))
	}

	pub fn max_length(self, length: u64) -> Self {
		self.annotate(Annotation::MaxLength(length))
	}

	pub fn min_length(self, length: u64) -> Self {
		self.annotate(Annotation::MinLength(length))
	}

	pub fn foreign_key(self, target: impl Into<String>) -> Self {
		self.annotate(Annotation::ForeignKey(target.into()))
	}

	pub fn has(&self, kind: AnnotationKind) -> bool {
		self.annotations.iter().any(|a| a.kind() == kind)
	}

	/// Annotations of one kind in declaration order
	pub fn annotations_of(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> {
		self.annotations.iter().filter(move |a| a.kind() == kind)
	}

	/// Explicit foreign-key target, if any
	pub fn foreign_key_target(&self) -> Option<&str> {
		self.annotations.iter().find_map(|a| match a {
			Annotation::ForeignKey(target) => Some(target.as_str()),
			_ => None,
		})
	}

	/// Display order, 0 unless a display annotation sets one
	pub fn display_order(&self) -> i32 {
		self.annotations
			.iter()
			.find_map(|a| match a {
				Annotation::Display(display) => display.order,
				_ => None,
			})
			.unwrap_or(0)
	}
}

macro_rules! describe {
	($($ty:ty => $type_ref:expr),* $(,)?) => {
		$(
			impl Describe for $ty {
				fn type_ref() -> TypeRef {
					$type_ref
				}
			}
		)*
	};
}

describe! {
	String => TypeRef::String,
	bool => TypeRef::Bool,
	char => TypeRef::Char,
	i8 => TypeRef::Int(IntKind::I8),
	i16 => TypeRef::Int(IntKind::I16),
	i32 => TypeRef::Int(IntKind::I32),
	i64 => TypeRef::Int(IntKind::I64),
	isize => TypeRef::Int(IntKind::I64),
	u8 => TypeRef::Int(IntKind::U8),
	u16 => TypeRef::Int(IntKind::U16),
	u32 => TypeRef::Int(IntKind::U32),
	u64 => TypeRef::Int(IntKind::U64),
	usize => TypeRef::Int(IntKind::U64),
	f32 => TypeRef::Float(FloatKind::F32),
	f64 => TypeRef::Float(FloatKind::F64),
	chrono::NaiveDate => TypeRef::Date,
	chrono::NaiveDateTime => TypeRef::DateTime,
	chrono::DateTime<chrono::Utc> => TypeRef::DateTimeOffset,
	chrono::DateTime<chrono::FixedOffset> => TypeRef::DateTimeOffset,
	chrono::NaiveTime => TypeRef::Time,
	chrono::TimeDelta => TypeRef::Duration,
	std::time::Duration => TypeRef::Duration,
}

impl<T: Describe> Describe for Option<T> {
	fn type_ref() -> TypeRef {
		TypeRef::optional(T::type_ref())
	}
}

impl<T: Describe> Describe for Vec<T> {
	fn type_ref() -> TypeRef {
		TypeRef::list(T::type_ref())
	}
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
	fn type_ref() -> TypeRef {
		TypeRef::map(K::type_ref(), V::type_ref())
	}
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
	fn type_ref() -> TypeRef {
		TypeRef::map(K::type_ref(), V::type_ref())
	}
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
	fn type_ref() -> TypeRef {
		TypeRef::map(K::type_ref(), V::type_ref())
	}
}
