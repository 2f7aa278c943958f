//! HAL resources and HAL-Forms resources
//!
//! A resource carries its links, embedded resources and a state payload whose
//! members are merged into the top level of the JSON object on the wire. The
//! state is either a strongly typed value `S` or, by default, an ordered
//! dynamic bag ([`DynamicState`]).

use crate::error::{HalError, HalResult};
use crate::link::{Link, Links, SELF_RELATION, push_link};
use crate::template::{DEFAULT_TEMPLATE, FormTemplate};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Schema-less state: the members of the JSON object in document order
pub type DynamicState = Map<String, Value>;

/// Embedded resources keyed by relation
pub type Embedded = IndexMap<String, Vec<Resource>>;

/// A HAL resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<S = DynamicState> {
	pub state: Option<S>,
	pub links: Option<Links>,
	pub embedded: Option<Embedded>,
}

impl<S> Default for Resource<S> {
	fn default() -> Self {
		Self {
			state: None,
			links: None,
			embedded: None,
		}
	}
}

impl<S> Resource<S> {
	pub fn new(state: S) -> Self {
		Self {
			state: Some(state),
			..Default::default()
		}
	}

	/// Creates a resource without state
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn with_state(mut self, state: S) -> Self {
		self.state = Some(state);
		self
	}

	/// Appends a link under `rel`
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::{Link, Resource};
	///
	/// let resource: Resource = Resource::empty()
	///     .with_link("item", Link::new("/orders/1"))
	///     .with_link("item", Link::new("/orders/2"));
	/// assert_eq!(resource.links_for("item").len(), 2);
	/// ```
	pub fn with_link(mut self, rel: impl Into<String>, link: Link) -> Self {
		self.add_link(rel, link);
		self
	}

	pub fn with_self_link(self, href: impl Into<String>) -> Self {
		self.with_link(SELF_RELATION, Link::new(href))
	}

	pub fn add_link(&mut self, rel: impl Into<String>, link: Link) {
		push_link(self.links.get_or_insert_with(Links::new), rel, link);
	}

	pub fn with_embedded(mut self, rel: impl Into<String>, resource: Resource) -> Self {
		self.add_embedded(rel, resource);
		self
	}

	pub fn add_embedded(&mut self, rel: impl Into<String>, resource: Resource) {
		self.embedded
			.get_or_insert_with(Embedded::new)
			.entry(rel.into())
			.or_default()
			.push(resource);
	}

	/// All links of a relation, empty when the relation is absent
	pub fn links_for(&self, rel: &str) -> &[Link] {
		self.links
			.as_ref()
			.and_then(|links| links.get(rel))
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// First link of a relation
	pub fn link(&self, rel: &str) -> Option<&Link> {
		self.links_for(rel).first()
	}

	pub fn self_link(&self) -> Option<&Link> {
		self.link(SELF_RELATION)
	}

	pub fn embedded_for(&self, rel: &str) -> &[Resource] {
		self.embedded
			.as_ref()
			.and_then(|embedded| embedded.get(rel))
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Replaces the state, keeping links and embedded resources
	pub fn map_state<T>(self, f: impl FnOnce(S) -> T) -> Resource<T> {
		Resource {
			state: self.state.map(f),
			links: self.links,
			embedded: self.embedded,
		}
	}
}

/// A HAL-Forms resource: a resource plus its form templates
#[derive(Debug, Clone, PartialEq)]
pub struct FormsResource<S = DynamicState> {
	pub resource: Resource<S>,
	pub templates: IndexMap<String, FormTemplate>,
}

impl<S> FormsResource<S> {
	/// Creates a forms resource whose only template is the default one
	pub fn new(state: Option<S>, default_template: FormTemplate) -> Self {
		let mut templates = IndexMap::new();
		templates.insert(DEFAULT_TEMPLATE.to_string(), default_template);
		Self {
			resource: Resource {
				state,
				..Default::default()
			},
			templates,
		}
	}

	/// Creates a forms resource from named templates
	///
	/// Fails when `templates` is empty.
	pub fn with_templates(
		resource: Resource<S>,
		templates: IndexMap<String, FormTemplate>,
	) -> HalResult<Self> {
		if templates.is_empty() {
			return Err(HalError::InvalidTemplates);
		}
		Ok(Self {
			resource,
			templates,
		})
	}

	pub fn state(&self) -> Option<&S> {
		self.resource.state.as_ref()
	}

	pub fn template(&self, name: &str) -> Option<&FormTemplate> {
		self.templates.get(name)
	}

	pub fn default_template(&self) -> Option<&FormTemplate> {
		self.template(DEFAULT_TEMPLATE)
	}

	/// Adds or replaces a named template
	pub fn insert_template(&mut self, name: impl Into<String>, template: FormTemplate) {
		self.templates.insert(name.into(), template);
	}

	pub fn with_link(mut self, rel: impl Into<String>, link: Link) -> Self {
		self.resource.add_link(rel, link);
		self
	}

	pub fn with_self_link(mut self, href: impl Into<String>) -> Self {
		self.resource.add_link(SELF_RELATION, Link::new(href));
		self
	}

	pub fn links_for(&self, rel: &str) -> &[Link] {
		self.resource.links_for(rel)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_links_absent_until_added() {
		let mut resource: Resource = Resource::empty();
		assert!(resource.links.is_none());
		assert!(resource.self_link().is_none());

		resource.add_link(SELF_RELATION, Link::new("/orders/1"));
		assert_eq!(resource.self_link().unwrap().href, "/orders/1");
		assert!(resource.links_for("next").is_empty());
	}

	#[rstest]
	fn test_embedded_grouped_by_relation() {
		let mut child = DynamicState::new();
		child.insert("id".to_string(), json!(7));
		let resource: Resource = Resource::empty()
			.with_embedded("items", Resource::new(child.clone()))
			.with_embedded("items", Resource::new(child));
		assert_eq!(resource.embedded_for("items").len(), 2);
	}

	#[rstest]
	fn test_forms_resource_requires_templates() {
		let result = FormsResource::<DynamicState>::with_templates(Resource::empty(), IndexMap::new());
		assert!(matches!(result, Err(HalError::InvalidTemplates)));

		let forms: FormsResource = FormsResource::new(None, FormTemplate::new("POST"));
		assert_eq!(forms.default_template().unwrap().method, "POST");
	}
}
