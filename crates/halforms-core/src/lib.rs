//! # halforms-core
//!
//! Document model of the HAL and HAL-Forms media types and their JSON
//! serialization.
//!
//! ## Model
//!
//! - [`Resource`]: state, links keyed by relation and embedded resources
//! - [`FormsResource`]: a resource plus named [`FormTemplate`]s
//! - [`Property`]: one form field, either typed ([`PropertyType`]) or a
//!   choice among [`Options`]
//!
//! ## Serialization
//!
//! [`HalSerializer`] merges the state members into the top level of the
//! document, next to `_templates`, `_links` and `_embedded`. Reading keeps
//! unknown members in an ordered state bag, or binds them to a typed state
//! through a [`StateBinder`].
//!
//! ```
//! use halforms_core::{FormTemplate, FormsResource, HalSerializer, Property, PropertyType};
//! use serde_json::json;
//!
//! let template = FormTemplate::new("POST")
//!     .with_property(Property::typed("title", PropertyType::Text));
//! let forms: FormsResource = FormsResource::new(None, template);
//!
//! let value = HalSerializer::default().forms_to_value(&forms).unwrap();
//! assert_eq!(
//!     value,
//!     json!({"_templates": {"default": {"method": "POST", "properties": [{"name": "title", "type": "text"}]}}})
//! );
//! ```

pub mod error;
pub mod link;
pub mod naming;
pub mod options;
pub mod resource;
pub mod serialization;
pub mod settings;
pub mod template;

pub use error::{HalError, HalResult};
pub use link::{Link, Links, SELF_RELATION};
pub use naming::NamingPolicy;
pub use options::{InlineOption, Options, OptionsLink};
pub use resource::{DynamicState, Embedded, FormsResource, Resource};
pub use serialization::{HalSerializer, IgnoreCondition, SerializerOptions, StateBinder};
pub use settings::{CyclePolicy, FormsSettings, HalSettings};
pub use template::{
	DEFAULT_CONTENT_TYPE, DEFAULT_METHOD, DEFAULT_TEMPLATE, FormTemplate, PromptDisplay, Property,
	PropertyKind, PropertyType, UnknownPropertyType,
};
