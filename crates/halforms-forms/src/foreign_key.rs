//! Foreign-key resolution
//!
//! A field holding the identity of another entity is turned into a choice
//! whose options come from a link. The referenced entity is found through a
//! sibling field: `categoryId` refers to the entity held by `category`.

use crate::annotations::AnnotationKind;
use crate::error::{FormsError, FormsResult};
use crate::rules::FieldContext;
use crate::shape::{Dto, FieldShape, ShapeRef, TypeRef, TypeShape};
use halforms_core::{Link, Options, OptionsLink};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Logical target of a URL, resolved by a [`LinkResolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
	/// Route name known to the resolver
	pub route: String,
	pub title: Option<String>,
	pub media_type: Option<String>,
}

impl LinkTarget {
	pub fn route(route: impl Into<String>) -> Self {
		Self {
			route: route.into(),
			title: None,
			media_type: None,
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_type = Some(media_type.into());
		self
	}

	/// Link to this target carrying its title and media type
	pub fn resolve(&self, resolver: &dyn LinkResolver, params: &HashMap<String, String>) -> FormsResult<Link> {
		let href = resolver.resolve_url(self, params).map_err(FormsError::Link)?;
		let mut link = Link::new(href);
		link.title = self.title.clone();
		link.media_type = self.media_type.clone();
		Ok(link)
	}
}

/// Builds URLs for logical targets
pub trait LinkResolver: Send + Sync {
	/// Resolves a target to an absolute or templated URL
	///
	/// # Arguments
	///
	/// * `target` - The logical target
	/// * `params` - Map of parameter names to values
	fn resolve_url(&self, target: &LinkTarget, params: &HashMap<String, String>) -> Result<String, String>;
}

/// Resolver backed by a table of URL patterns
///
/// `{name}` placeholders are replaced by parameters; placeholders without a
/// parameter stay in place and make the URL a template.
///
/// # Examples
///
/// ```
/// use halforms_forms::{LinkResolver, LinkTarget, PatternLinkResolver};
/// use std::collections::HashMap;
///
/// let resolver = PatternLinkResolver::new().route("order-detail", "/orders/{id}");
/// let mut params = HashMap::new();
/// params.insert("id".to_string(), "7".to_string());
///
/// let target = LinkTarget::route("order-detail");
/// assert_eq!(resolver.resolve_url(&target, &params).unwrap(), "/orders/7");
/// assert_eq!(resolver.resolve_url(&target, &HashMap::new()).unwrap(), "/orders/{id}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternLinkResolver {
	patterns: HashMap<String, String>,
}

impl PatternLinkResolver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
		self.patterns.insert(name.into(), pattern.into());
		self
	}
}

impl LinkResolver for PatternLinkResolver {
	fn resolve_url(&self, target: &LinkTarget, params: &HashMap<String, String>) -> Result<String, String> {
		let pattern = self
			.patterns
			.get(&target.route)
			.ok_or_else(|| format!("Unknown route `{}`", target.route))?;
		let mut url = pattern.clone();
		for (name, value) in params {
			url = url.replace(&format!("{{{}}}", name), value);
		}
		Ok(url)
	}
}

/// Produces the options link of entities of some types
pub trait ForeignKeyLinkFactory: Send + Sync {
	fn can_create_link(&self, shape: &ShapeRef) -> bool;

	fn create_link(&self, shape: &ShapeRef) -> FormsResult<Link>;
}

/// [`ForeignKeyLinkFactory`] mapping registered types to routes
#[derive(Clone)]
pub struct RouteLinkFactory {
	resolver: Arc<dyn LinkResolver>,
	routes: HashMap<TypeId, LinkTarget>,
}

impl fmt::Debug for RouteLinkFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteLinkFactory")
			.field("routes", &self.routes.values().collect::<Vec<_>>())
			.finish()
	}
}

impl RouteLinkFactory {
	pub fn new(resolver: Arc<dyn LinkResolver>) -> Self {
		Self {
			resolver,
			routes: HashMap::new(),
		}
	}

	/// Lists entities of type `T` at `target`
	pub fn route<T: Dto>(mut self, target: LinkTarget) -> Self {
		self.routes.insert(TypeId::of::<T>(), target);
		self
	}
}

impl ForeignKeyLinkFactory for RouteLinkFactory {
	fn can_create_link(&self, shape: &ShapeRef) -> bool {
		self.routes.contains_key(&shape.id())
	}

	fn create_link(&self, shape: &ShapeRef) -> FormsResult<Link> {
		let target = self
			.routes
			.get(&shape.id())
			.ok_or_else(|| FormsError::Link(format!("No route registered for `{}`", shape.type_name())))?;
		target.resolve(self.resolver.as_ref(), &HashMap::new())
	}
}

/// Name of the sibling field a field refers to by convention: a trailing
/// `id` and any separator before it are stripped.
///
/// # Examples
///
/// ```
/// use halforms_forms::foreign_key::conventional_target;
///
/// assert_eq!(conventional_target("CategoryId"), Some("Category"));
/// assert_eq!(conventional_target("owner_id"), Some("owner"));
/// assert_eq!(conventional_target("id"), None);
/// assert_eq!(conventional_target("name"), None);
/// ```
pub fn conventional_target(name: &str) -> Option<&str> {
	if name.len() <= 2 || !name.is_char_boundary(name.len() - 2) {
		return None;
	}
	let (stem, suffix) = name.split_at(name.len() - 2);
	if !suffix.eq_ignore_ascii_case("id") {
		return None;
	}
	let stem = stem.trim_end_matches(['_', '-']);
	(!stem.is_empty()).then_some(stem)
}

/// Primary key of a shape: an own key field, an inherited key field, an own
/// `id` field, then an inherited `id` field.
pub fn primary_key(shape: &TypeShape) -> FormsResult<String> {
	let own = &shape.fields;
	let inherited = shape.inherited_fields();
	let is_key = |f: &&FieldShape| f.has(AnnotationKind::Key);
	let is_id = |f: &&FieldShape| f.name.eq_ignore_ascii_case("id");

	own.iter()
		.find(is_key)
		.or_else(|| inherited.iter().find(is_key))
		.or_else(|| own.iter().find(is_id))
		.or_else(|| inherited.iter().find(is_id))
		.map(|f| f.name.clone())
		.ok_or_else(|| FormsError::NoPrimaryKey {
			type_name: shape.name.clone(),
		})
}

fn is_string(field: &FieldShape) -> bool {
	*field.ty.non_optional() == TypeRef::String
}

fn sole<'a>(mut fields: impl Iterator<Item = &'a FieldShape>) -> Option<&'a FieldShape> {
	let first = fields.next()?;
	fields.next().is_none().then_some(first)
}

/// Display column of a shape: the declared one, else the only own field,
/// the only own string field, the only field, or the only string field.
pub fn display_column(shape: &TypeShape) -> FormsResult<String> {
	if let Some(column) = &shape.display_column {
		return Ok(column.clone());
	}
	let own = &shape.fields;
	let all = shape.all_fields();
	sole(own.iter())
		.or_else(|| sole(own.iter().filter(|f| is_string(f))))
		.or_else(|| sole(all.iter()))
		.or_else(|| sole(all.iter().filter(|f| is_string(f))))
		.map(|f| f.name.clone())
		.ok_or_else(|| FormsError::AmbiguousDisplayColumn {
			type_name: shape.name.clone(),
		})
}

/// Resolves foreign-key fields into link-backed options
#[derive(Clone, Default)]
pub struct ForeignKeyResolver {
	factories: Vec<Arc<dyn ForeignKeyLinkFactory>>,
	convention: bool,
}

impl fmt::Debug for ForeignKeyResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ForeignKeyResolver")
			.field("factories", &self.factories.len())
			.field("convention", &self.convention)
			.finish()
	}
}

impl ForeignKeyResolver {
	/// `convention` enables resolution of unannotated `…Id` fields
	pub fn new(convention: bool) -> Self {
		Self {
			factories: Vec::new(),
			convention,
		}
	}

	pub fn push(&mut self, factory: Arc<dyn ForeignKeyLinkFactory>) {
		self.factories.push(factory);
	}

	/// Name of the sibling field `field` refers to, if it is a foreign key
	fn target_name<'f>(&self, field: &'f FieldShape) -> Option<&'f str> {
		match field.foreign_key_target() {
			Some(explicit) => Some(explicit),
			None if self.convention => conventional_target(&field.name),
			None => None,
		}
	}

	/// Options of a foreign-key field, `None` when the field is not one or
	/// no factory handles the referenced type
	pub fn resolve(&self, ctx: &FieldContext<'_>, required: bool) -> FormsResult<Option<Options>> {
		let Some(target_name) = self.target_name(ctx.field) else {
			return Ok(None);
		};
		let Some(target) = ctx.owner.find_field(target_name) else {
			return Ok(None);
		};
		let Some(referenced) = target.ty.referenced_shape() else {
			return Ok(None);
		};
		let Some(factory) = self.factories.iter().find(|f| f.can_create_link(&referenced)) else {
			tracing::trace!(field = %ctx.field.name, referenced = referenced.type_name(), "No link factory for foreign key");
			return Ok(None);
		};

		let link = factory.create_link(&referenced)?;
		let shape = referenced.shape();
		let options = Options {
			link: Some(OptionsLink::from(link)),
			value_field: Some(ctx.naming.apply(&primary_key(&shape)?)),
			prompt_field: Some(ctx.naming.apply(&display_column(&shape)?)),
			min_items: Some(u64::from(required)),
			max_items: if ctx.field.ty.non_optional().is_enumerable() {
				None
			} else {
				Some(1)
			},
			..Default::default()
		};
		Ok(Some(options))
	}
}
