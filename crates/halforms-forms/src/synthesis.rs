//! Template synthesis
//!
//! Builds a [`FormTemplate`] from a registered shape: every eligible field,
//! ordered by display order, runs through inference, foreign-key resolution,
//! the rule pipeline and default backfill. Object, list and map fields get a
//! nested `default` template of their element shape.

use crate::cache::{
	DefaultValueCache, InMemoryDefaultValueCache, InMemoryTemplateCache, TemplateCache, TemplateKey,
};
use crate::error::{FormsError, FormsResult};
use crate::fill::ValueFiller;
use crate::foreign_key::{ForeignKeyLinkFactory, ForeignKeyResolver};
use crate::inference::{NestedShape, infer_property};
use crate::rules::{DefaultValueRule, FieldContext, PropertyRule, RuleSet, should_include};
use crate::shape::{Dto, FieldShape, ShapeRef, TypeShape};
use halforms_core::{
	CyclePolicy, DEFAULT_TEMPLATE, FormTemplate, FormsSettings, HalSettings, NamingPolicy, Property,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

const ELEMENT_FIELD: &str = "value";
const KEY_FIELD: &str = "key";

/// Wraps a template as the only nested template of a property
pub fn default_templates(template: FormTemplate) -> IndexMap<String, FormTemplate> {
	let mut templates = IndexMap::with_capacity(1);
	templates.insert(DEFAULT_TEMPLATE.to_string(), template);
	templates
}

/// Synthesizes and fills form templates
///
/// # Examples
///
/// ```
/// use halforms_core::PropertyType;
/// use halforms_forms::{Dto, FieldShape, TemplateGenerator, TypeShape};
///
/// struct Person;
///
/// impl Dto for Person {
///     fn shape() -> TypeShape {
///         TypeShape::new("Person")
///             .field(FieldShape::of::<i32>("Id"))
///             .field(FieldShape::of::<String>("Name").required())
///     }
/// }
///
/// let generator = TemplateGenerator::new();
/// let template = generator.synthesize::<Person>("POST", None, None).unwrap();
///
/// let id = template.property("id").unwrap();
/// assert_eq!(id.property_type(), Some(PropertyType::Number));
/// assert!(id.read_only);
/// let name = template.property("name").unwrap();
/// assert_eq!(name.property_type(), Some(PropertyType::Text));
/// assert!(name.required);
/// ```
#[derive(Clone)]
pub struct TemplateGenerator {
	settings: FormsSettings,
	naming: NamingPolicy,
	rules: RuleSet,
	foreign_keys: ForeignKeyResolver,
	default_values: DefaultValueRule,
	templates: Arc<dyn TemplateCache>,
	filler: ValueFiller,
}

impl Default for TemplateGenerator {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for TemplateGenerator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TemplateGenerator")
			.field("settings", &self.settings)
			.field("naming", &self.naming)
			.field("rules", &self.rules)
			.field("foreign_keys", &self.foreign_keys)
			.finish()
	}
}

impl TemplateGenerator {
	/// Generator with default settings, built-in rules and in-memory caches
	pub fn new() -> Self {
		Self::from_settings(&HalSettings::default())
	}

	pub fn from_settings(settings: &HalSettings) -> Self {
		Self {
			settings: settings.forms.clone(),
			naming: settings.naming_policy,
			rules: RuleSet::builtin(),
			foreign_keys: ForeignKeyResolver::new(settings.forms.foreign_key_convention),
			default_values: DefaultValueRule::new(Arc::new(InMemoryDefaultValueCache::new())),
			templates: Arc::new(InMemoryTemplateCache::new()),
			filler: ValueFiller::new(settings.naming_policy),
		}
	}

	pub fn with_rules(mut self, rules: RuleSet) -> Self {
		self.rules = rules;
		self
	}

	pub fn with_rule(mut self, rule: impl PropertyRule + 'static) -> Self {
		self.rules.push(Arc::new(rule));
		self
	}

	pub fn with_link_factory(mut self, factory: Arc<dyn ForeignKeyLinkFactory>) -> Self {
		self.foreign_keys.push(factory);
		self
	}

	pub fn with_template_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
		self.templates = cache;
		self
	}

	pub fn with_default_value_cache(mut self, cache: Arc<dyn DefaultValueCache>) -> Self {
		self.default_values = DefaultValueRule::new(cache);
		self
	}

	pub fn with_filler(mut self, filler: ValueFiller) -> Self {
		self.filler = filler;
		self
	}

	pub fn settings(&self) -> &FormsSettings {
		&self.settings
	}

	pub fn naming(&self) -> NamingPolicy {
		self.naming
	}

	pub fn filler(&self) -> &ValueFiller {
		&self.filler
	}

	/// Template of `T`; `content_type` defaults to the configured one
	pub fn synthesize<T: Dto>(
		&self,
		method: &str,
		title: Option<&str>,
		content_type: Option<&str>,
	) -> FormsResult<FormTemplate> {
		self.synthesize_shape(ShapeRef::of::<T>(), method, title, content_type)
	}

	/// Template of `T` submitted with the configured default method
	pub fn synthesize_default<T: Dto>(&self) -> FormsResult<FormTemplate> {
		self.synthesize::<T>(&self.settings.default_method, None, None)
	}

	pub fn synthesize_shape(
		&self,
		shape: ShapeRef,
		method: &str,
		title: Option<&str>,
		content_type: Option<&str>,
	) -> FormsResult<FormTemplate> {
		let key = TemplateKey {
			type_id: shape.id(),
			method: method.to_string(),
			title: title.map(str::to_string),
			content_type: content_type
				.unwrap_or(&self.settings.default_content_type)
				.to_string(),
		};
		if let Some(template) = self.templates.get(&key) {
			return Ok(template);
		}

		tracing::debug!(shape = shape.type_name(), method, "Synthesizing form template");
		let mut stack = Vec::new();
		let properties = self.object_properties(shape, &mut stack)?;
		let template = FormTemplate {
			content_type: key.content_type.clone(),
			method: key.method.clone(),
			target: None,
			title: key.title.clone(),
			properties,
		};
		Ok(self.templates.get_or_insert(key, template))
	}

	/// Fills a template with the values of `instance`
	pub fn fill<T: Serialize>(&self, template: &FormTemplate, instance: &T) -> FormsResult<FormTemplate> {
		let value = serde_json::to_value(instance)?;
		self.filler.fill_value(template, &value)
	}

	/// Properties of a registered shape, guarding against shapes that
	/// contain themselves
	fn object_properties(&self, shape: ShapeRef, stack: &mut Vec<ShapeRef>) -> FormsResult<Vec<Property>> {
		stack.push(shape);
		let result = self.shape_properties(&shape.shape(), Some(shape), stack);
		stack.pop();
		result
	}

	fn shape_properties(
		&self,
		shape: &TypeShape,
		owner_ref: Option<ShapeRef>,
		stack: &mut Vec<ShapeRef>,
	) -> FormsResult<Vec<Property>> {
		let mut fields: Vec<FieldShape> = shape.all_fields().into_iter().filter(should_include).collect();
		fields.sort_by_key(FieldShape::display_order);

		let mut properties = Vec::with_capacity(fields.len());
		for field in &fields {
			let ctx = FieldContext {
				field,
				owner: shape,
				owner_ref,
				naming: self.naming,
			};
			properties.push(self.field_property(&ctx, stack)?);
		}
		Ok(properties)
	}

	fn field_property(&self, ctx: &FieldContext<'_>, stack: &mut Vec<ShapeRef>) -> FormsResult<Property> {
		let applicable = self.rules.applicable(ctx);
		if applicable.exclusive {
			let mut property = Property::new(ctx.property_name());
			applicable.apply(ctx, &mut property)?;
			return Ok(property);
		}

		let inference = infer_property(&ctx.property_name(), &ctx.field.ty);
		let mut property = inference.property;
		match self.foreign_keys.resolve(ctx, property.required)? {
			Some(options) => property.set_options(options),
			None => {
				if let Some(nested) = inference.nested {
					let template = self.nested_template(&nested, stack)?;
					property.templates = Some(default_templates(template));
				}
			}
		}

		applicable.apply(ctx, &mut property)?;
		self.default_values.apply(ctx, &mut property)?;
		Ok(property)
	}

	fn nested_template(&self, nested: &NestedShape, stack: &mut Vec<ShapeRef>) -> FormsResult<FormTemplate> {
		let properties = match nested {
			NestedShape::Object(shape) => {
				if stack.contains(shape) {
					return self.on_cycle(*shape, stack);
				}
				self.object_properties(*shape, stack)?
			}
			NestedShape::Element(element) => {
				let entry = TypeShape::new("Element").field(FieldShape::new(ELEMENT_FIELD, element.clone()));
				self.shape_properties(&entry, None, stack)?
			}
			NestedShape::KeyValue { key, value } => {
				let entry = TypeShape::new("KeyValuePair")
					.field(FieldShape::new(KEY_FIELD, key.clone()))
					.field(FieldShape::new(ELEMENT_FIELD, value.clone()));
				let mut properties = self.shape_properties(&entry, None, stack)?;
				// the key of an entry is required whatever its declared nullability
				let key_name = self.naming.apply(KEY_FIELD);
				if let Some(key) = properties.iter_mut().find(|p| p.name == key_name) {
					key.required = true;
				}
				properties
			}
		};
		Ok(FormTemplate {
			properties,
			..FormTemplate::default()
		})
	}

	fn on_cycle(&self, shape: ShapeRef, stack: &[ShapeRef]) -> FormsResult<FormTemplate> {
		let path = stack
			.iter()
			.map(|s| s.type_name())
			.chain(std::iter::once(shape.type_name()))
			.collect::<Vec<_>>()
			.join(" -> ");
		match self.settings.cycle_policy {
			CyclePolicy::Truncate => {
				tracing::warn!(shape = shape.type_name(), %path, "Self-referencing shape, nested template truncated");
				Ok(FormTemplate::default())
			}
			CyclePolicy::Error => Err(FormsError::CyclicShape {
				type_name: shape.type_name().to_string(),
				path,
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::annotations::{Annotation, Display};
	use crate::foreign_key::{LinkTarget, PatternLinkResolver, RouteLinkFactory};
	use crate::shape::TypeRef;
	use halforms_core::PropertyType;
	use rstest::rstest;
	use serde_json::json;

	struct Node;

	impl Dto for Node {
		fn shape() -> TypeShape {
			TypeShape::new("Node")
				.field(FieldShape::of::<String>("label"))
				.field(FieldShape::new("children", TypeRef::list(TypeRef::object::<Node>())))
		}
	}

	struct Address;

	impl Dto for Address {
		fn shape() -> TypeShape {
			TypeShape::new("Address")
				.field(FieldShape::of::<String>("street"))
				.field(FieldShape::of::<Option<String>>("city"))
		}
	}

	struct Customer;

	impl Dto for Customer {
		fn shape() -> TypeShape {
			TypeShape::new("Customer")
				.field(FieldShape::of::<String>("name").display(Display::named("Name").with_order(2)))
				.field(FieldShape::of::<i64>("id").display(Display::named("Id").with_order(1)))
				.field(FieldShape::of::<String>("secret").ignore())
				.field(FieldShape::new("addresses", TypeRef::list(TypeRef::object::<Address>())))
				.field(FieldShape::of::<std::collections::HashMap<String, i32>>("scores"))
				.field(FieldShape::of::<Vec<String>>("tags"))
		}
	}

	#[rstest]
	fn test_fields_ordered_and_filtered() {
		let template = TemplateGenerator::new().synthesize::<Customer>("PUT", Some("Edit"), None).unwrap();
		let names: Vec<&str> = template.properties.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["addresses", "scores", "tags", "id", "name"]);
		assert_eq!(template.title.as_deref(), Some("Edit"));
		assert_eq!(template.method, "PUT");
	}

	#[rstest]
	fn test_nested_templates() {
		let template = TemplateGenerator::new().synthesize::<Customer>("POST", None, None).unwrap();

		let addresses = template.property("addresses").unwrap();
		assert_eq!(addresses.property_type(), Some(PropertyType::Collection));
		let nested = addresses.default_template().unwrap();
		assert_eq!(nested.properties.len(), 2);
		assert!(!nested.property("city").unwrap().required);

		let scores = template.property("scores").unwrap().default_template().unwrap();
		assert!(scores.property("key").unwrap().required);
		assert_eq!(scores.property("value").unwrap().property_type(), Some(PropertyType::Number));

		let tags = template.property("tags").unwrap().default_template().unwrap();
		assert_eq!(tags.properties.len(), 1);
		assert_eq!(tags.properties[0].name, "value");
	}

	#[rstest]
	fn test_cycle_truncated_by_default() {
		let template = TemplateGenerator::new().synthesize::<Node>("POST", None, None).unwrap();
		let children = template.property("children").unwrap();
		let nested = children.default_template().unwrap();
		assert!(nested.properties.is_empty());
	}

	#[rstest]
	fn test_cycle_error_policy() {
		let mut settings = HalSettings::default();
		settings.forms.cycle_policy = CyclePolicy::Error;
		let result = TemplateGenerator::from_settings(&settings).synthesize::<Node>("POST", None, None);
		assert!(matches!(result, Err(FormsError::CyclicShape { .. })));
	}

	#[rstest]
	fn test_cached_per_method() {
		let cache = Arc::new(InMemoryTemplateCache::new());
		let generator = TemplateGenerator::new().with_template_cache(cache.clone());
		generator.synthesize::<Address>("POST", None, None).unwrap();
		generator.synthesize::<Address>("POST", None, None).unwrap();
		generator.synthesize::<Address>("PUT", None, None).unwrap();
		assert_eq!(cache.len(), 2);
	}

	struct Category;

	impl Dto for Category {
		fn shape() -> TypeShape {
			TypeShape::new("Category")
				.field(FieldShape::of::<i32>("Id"))
				.field(FieldShape::of::<String>("Name"))
		}
	}

	struct Product;

	impl Dto for Product {
		fn shape() -> TypeShape {
			TypeShape::new("Product")
				.field(FieldShape::of::<i32>("CategoryId"))
				.field(FieldShape::new("Categories", TypeRef::list(TypeRef::object::<Category>())))
				.field(FieldShape::of::<Vec<i32>>("CategoryIds").foreign_key("Categories"))
		}
	}

	fn generator_with_links() -> TemplateGenerator {
		let resolver = PatternLinkResolver::new().route("categories", "/categories");
		let factory = RouteLinkFactory::new(Arc::new(resolver)).route::<Category>(LinkTarget::route("categories"));
		TemplateGenerator::new().with_link_factory(Arc::new(factory))
	}

	#[rstest]
	fn test_foreign_key_list_has_no_nested_templates() {
		let template = generator_with_links().synthesize::<Product>("POST", None, None).unwrap();
		let ids = template.property("categoryIds").unwrap();
		assert_eq!(ids.property_type(), None);
		assert!(ids.templates.is_none());
		assert_eq!(ids.options().unwrap().max_items, None);

		// no sibling named `Category`, so the convention does not apply
		let single = template.property("categoryId").unwrap();
		assert_eq!(single.property_type(), Some(PropertyType::Number));
	}

	struct Locked;

	impl PropertyRule for Locked {
		fn exclusive(&self) -> bool {
			true
		}

		fn applies_to(&self, ctx: &FieldContext<'_>) -> bool {
			ctx.field.name == "street"
		}

		fn apply(&self, _ctx: &FieldContext<'_>, property: &mut Property) -> FormsResult<()> {
			property.set_type(PropertyType::Hidden);
			property.value = Some(json!("n/a"));
			Ok(())
		}
	}

	#[rstest]
	fn test_exclusive_rule_replaces_synthesis() {
		let generator = TemplateGenerator::new().with_rule(Locked);
		let template = generator.synthesize::<Address>("POST", None, None).unwrap();
		let street = template.property("street").unwrap();
		assert_eq!(street.property_type(), Some(PropertyType::Hidden));
		assert!(!street.required);
		assert_eq!(street.value, Some(json!("n/a")));
		assert_eq!(template.property("city").unwrap().property_type(), Some(PropertyType::Text));
	}

	#[rstest]
	fn test_annotation_rules_after_inference() {
		struct Note;
		impl Dto for Note {
			fn shape() -> TypeShape {
				TypeShape::new("Note").field(
					FieldShape::of::<Option<String>>("body")
						.required()
						.annotate(Annotation::UiHint("textarea".to_string())),
				)
			}
		}
		let template = TemplateGenerator::new().synthesize::<Note>("POST", None, None).unwrap();
		let body = template.property("body").unwrap();
		assert!(body.required);
		assert_eq!(body.property_type(), Some(PropertyType::Textarea));
	}
}
