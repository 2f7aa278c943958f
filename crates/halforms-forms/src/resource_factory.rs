//! Forms resource generation
//!
//! Combines synthesis and filling into a ready-to-serialize
//! [`FormsResource`]: the state of the instance, its filled default template
//! with a resolved target, and a `self` link.

use crate::error::FormsResult;
use crate::foreign_key::{LinkResolver, LinkTarget};
use crate::shape::{Dto, ShapeRef};
use crate::synthesis::TemplateGenerator;
use halforms_core::serialization::to_state_value;
use halforms_core::{FormsResource, Resource, SELF_RELATION, SerializerOptions};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a generated form submits and where
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormRequest {
	/// Submission method; the configured default when `None`
	pub method: Option<String>,
	pub title: Option<String>,
	pub content_type: Option<String>,
	/// Where the form submits to
	pub target: Option<LinkTarget>,
	/// Target of the resource's `self` link
	pub self_target: Option<LinkTarget>,
	/// Parameters substituted into both targets
	pub params: HashMap<String, String>,
}

impl FormRequest {
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: Some(method.into()),
			..Default::default()
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());
		self
	}

	pub fn with_target(mut self, target: LinkTarget) -> Self {
		self.target = Some(target);
		self
	}

	pub fn with_self(mut self, target: LinkTarget) -> Self {
		self.self_target = Some(target);
		self
	}

	pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
		self.params.insert(name.into(), value.to_string());
		self
	}
}

/// A resource under generation
#[derive(Clone, Copy)]
pub struct ResourceContext<'a> {
	pub shape: ShapeRef,
	/// JSON form of the instance, `Value::Null` for an empty form
	pub instance: &'a Value,
	pub request: &'a FormRequest,
	pub resolver: &'a dyn LinkResolver,
	pub templates: &'a TemplateGenerator,
}

/// A step of resource generation
pub trait ResourceRule: Send + Sync {
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	fn order(&self) -> i32 {
		0
	}

	/// Exclusive rules replace the default generation
	fn exclusive(&self) -> bool {
		false
	}

	fn applies_to(&self, ctx: &ResourceContext<'_>) -> bool;

	fn apply(&self, ctx: &ResourceContext<'_>, resource: &mut FormsResource) -> FormsResult<()>;
}

/// Generates forms resources for registered shapes
#[derive(Clone)]
pub struct FormsResourceGenerator {
	templates: TemplateGenerator,
	resolver: Arc<dyn LinkResolver>,
	rules: Vec<Arc<dyn ResourceRule>>,
}

impl fmt::Debug for FormsResourceGenerator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormsResourceGenerator")
			.field("templates", &self.templates)
			.field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
			.finish()
	}
}

impl FormsResourceGenerator {
	pub fn new(templates: TemplateGenerator, resolver: Arc<dyn LinkResolver>) -> Self {
		Self {
			templates,
			resolver,
			rules: Vec::new(),
		}
	}

	pub fn with_rule(mut self, rule: impl ResourceRule + 'static) -> Self {
		self.rules.push(Arc::new(rule));
		self
	}

	pub fn templates(&self) -> &TemplateGenerator {
		&self.templates
	}

	/// Resource holding `instance` and its filled default template
	///
	/// The state keeps the member names of the generator's naming policy at
	/// every depth.
	pub fn generate<T: Dto + Serialize>(&self, instance: &T, request: &FormRequest) -> FormsResult<FormsResource> {
		let naming = SerializerOptions::new().naming_policy(self.templates.naming());
		let value = to_state_value(instance, &naming)?;
		self.generate_value(ShapeRef::of::<T>(), &value, request)
	}

	/// Resource without state whose default template carries no values
	pub fn generate_empty<T: Dto>(&self, request: &FormRequest) -> FormsResult<FormsResource> {
		self.generate_value(ShapeRef::of::<T>(), &Value::Null, request)
	}

	pub fn generate_value(&self, shape: ShapeRef, instance: &Value, request: &FormRequest) -> FormsResult<FormsResource> {
		let ctx = ResourceContext {
			shape,
			instance,
			request,
			resolver: self.resolver.as_ref(),
			templates: &self.templates,
		};

		let mut rules: Vec<_> = self.rules.iter().filter(|r| r.applies_to(&ctx)).collect();
		rules.sort_by_key(|r| r.order());
		let exclusive = rules.iter().any(|r| r.exclusive());

		let mut resource = if exclusive {
			FormsResource {
				resource: Resource::default(),
				templates: IndexMap::new(),
			}
		} else {
			self.default_resource(&ctx)?
		};
		for rule in rules.into_iter().filter(|r| !exclusive || r.exclusive()) {
			tracing::trace!(rule = rule.name(), shape = shape.type_name(), "Applying resource rule");
			rule.apply(&ctx, &mut resource)?;
		}

		Ok(FormsResource::with_templates(resource.resource, resource.templates)?)
	}

	fn default_resource(&self, ctx: &ResourceContext<'_>) -> FormsResult<FormsResource> {
		let request = ctx.request;
		let method = request
			.method
			.as_deref()
			.unwrap_or(&self.templates.settings().default_method);
		let template = self.templates.synthesize_shape(
			ctx.shape,
			method,
			request.title.as_deref(),
			request.content_type.as_deref(),
		)?;
		let mut template = match ctx.instance {
			Value::Null => template,
			instance => self.templates.filler().fill_value(&template, instance)?,
		};
		if let Some(target) = &request.target {
			template.target = Some(target.resolve(ctx.resolver, &request.params)?.href);
		}

		let state = match ctx.instance {
			Value::Object(members) => Some(members.clone()),
			_ => None,
		};
		let mut resource = FormsResource::new(state, template);
		if let Some(target) = &request.self_target {
			resource
				.resource
				.add_link(SELF_RELATION, target.resolve(ctx.resolver, &request.params)?);
		}
		tracing::debug!(shape = ctx.shape.type_name(), "Generated forms resource");
		Ok(resource)
	}
}
