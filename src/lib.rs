//! # halforms
//!
//! HAL and HAL-Forms hypermedia documents for Rust, with form templates
//! synthesized from DTO shapes.
//!
//! ## Feature Flags
//!
//! - `minimal` - Document model and JSON serialization only
//! - `forms` (default) - Template synthesis, value filling and forms
//!   resource generation
//! - `full` - All features enabled
//!
//! ## Quick Example
//!
//! ```
//! use halforms::prelude::*;
//! use serde_json::json;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Order {
//!     id: i64,
//!     note: String,
//! }
//!
//! impl Dto for Order {
//!     fn shape() -> TypeShape {
//!         TypeShape::new("Order")
//!             .field(FieldShape::of::<i64>("id"))
//!             .field(FieldShape::of::<String>("note").max_length(200))
//!     }
//! }
//!
//! let generator = TemplateGenerator::new();
//! let template = generator.synthesize::<Order>("PUT", None, None).unwrap();
//! let order = Order { id: 7, note: "ring twice".to_string() };
//!
//! let filled = generator.fill(&template, &order).unwrap();
//! let forms = FormsResource::new(Some(order), filled).with_self_link("/orders/7");
//! let document = HalSerializer::default().forms_to_value(&forms).unwrap();
//!
//! assert_eq!(document["note"], json!("ring twice"));
//! assert_eq!(document["_links"]["self"][0]["href"], json!("/orders/7"));
//! assert_eq!(document["_templates"]["default"]["method"], json!("PUT"));
//! ```

pub use halforms_core;
#[cfg(feature = "forms")]
pub use halforms_forms;

pub use halforms_core::{
	CyclePolicy, DEFAULT_CONTENT_TYPE, DEFAULT_METHOD, DEFAULT_TEMPLATE, DynamicState, Embedded, FormTemplate,
	FormsResource, FormsSettings, HalError, HalResult, HalSerializer, HalSettings, IgnoreCondition, InlineOption, Link,
	Links, NamingPolicy, Options, OptionsLink, PromptDisplay, Property, PropertyKind, PropertyType, Resource,
	SELF_RELATION, SerializerOptions, StateBinder,
};

#[cfg(feature = "forms")]
pub use halforms_forms::{
	Annotation, Describe, Display, Dto, DtoEnum, EnumShape, FieldShape, FormRequest, FormsError, FormsResourceGenerator,
	FormsResult, LinkResolver, LinkTarget, PatternLinkResolver, RouteLinkFactory, ShapeRef, TemplateGenerator, TypeRef,
	TypeShape, ValueFiller,
};

/// Prelude module for convenient imports
///
/// Import everything commonly needed with:
/// ```rust
/// use halforms::prelude::*;
/// ```
pub mod prelude {
	// Core types - always available
	pub use crate::{
		FormTemplate, FormsResource, HalError, HalSerializer, HalSettings, Link, NamingPolicy, Options, Property,
		PropertyType, Resource,
	};

	// External
	pub use serde::{Deserialize, Serialize};

	// Forms feature - synthesis and filling
	#[cfg(feature = "forms")]
	pub use crate::{
		Annotation, Dto, DtoEnum, EnumShape, FieldShape, FormRequest, FormsError, FormsResourceGenerator, LinkTarget,
		PatternLinkResolver, TemplateGenerator, TypeRef, TypeShape,
	};
}
