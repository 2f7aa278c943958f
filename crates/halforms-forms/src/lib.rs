//! # halforms-forms
//!
//! HAL-Forms template synthesis from registered DTO shapes.
//!
//! A DTO describes its fields once by implementing [`Dto`]. The
//! [`TemplateGenerator`] turns that shape into a [`FormTemplate`]:
//!
//! 1. fields are filtered and ordered by their display annotations
//! 2. each field gets a property type inferred from its [`TypeRef`]
//! 3. foreign keys become link-backed options
//! 4. annotation rules and user rules refine the property
//! 5. required read-only fields are backfilled from a default instance
//!
//! [`ValueFiller`] then produces value-bearing copies of a template for
//! concrete instances, and [`FormsResourceGenerator`] wraps both steps into a
//! ready-to-serialize [`halforms_core::FormsResource`].
//!
//! ```
//! use halforms_core::PropertyType;
//! use halforms_forms::{Dto, FieldShape, TemplateGenerator, TypeShape};
//! use serde::Serialize;
//! use serde_json::json;
//!
//! #[derive(Serialize)]
//! struct Contact {
//!     email: String,
//! }
//!
//! impl Dto for Contact {
//!     fn shape() -> TypeShape {
//!         TypeShape::new("Contact").field(FieldShape::of::<String>("email").max_length(120))
//!     }
//! }
//!
//! let generator = TemplateGenerator::new();
//! let template = generator.synthesize::<Contact>("PUT", None, None).unwrap();
//! let filled = generator
//!     .fill(&template, &Contact { email: "ada@example.com".to_string() })
//!     .unwrap();
//!
//! let email = filled.property("email").unwrap();
//! assert_eq!(email.property_type(), Some(PropertyType::Text));
//! assert_eq!(email.max_length, Some(120));
//! assert_eq!(email.value, Some(json!("ada@example.com")));
//! ```
//!
//! [`FormTemplate`]: halforms_core::FormTemplate

pub mod annotations;
pub mod cache;
pub mod error;
pub mod fill;
pub mod foreign_key;
pub mod inference;
pub mod resource_factory;
pub mod rules;
pub mod shape;
pub mod synthesis;

pub use annotations::{Annotation, AnnotationKind, DataTypeHint, Display, ExtensionData};
pub use cache::{
	DefaultValueCache, InMemoryDefaultValueCache, InMemoryTemplateCache, NoTemplateCache, TemplateCache, TemplateKey,
};
pub use error::{FormsError, FormsResult};
pub use fill::{PropertyValueRule, ValueContext, ValueFiller};
pub use foreign_key::{ForeignKeyLinkFactory, LinkResolver, LinkTarget, PatternLinkResolver, RouteLinkFactory};
pub use inference::{Inference, NestedShape, enum_options, infer_property};
pub use resource_factory::{FormRequest, FormsResourceGenerator, ResourceContext, ResourceRule};
pub use rules::{AnnotationRule, DefaultValueRule, FieldContext, PropertyRule, RuleSet};
pub use shape::{Describe, Dto, DtoEnum, EnumShape, FieldShape, FloatKind, IntKind, ShapeRef, TypeRef, TypeShape};
pub use synthesis::TemplateGenerator;
