//! Property rule pipeline
//!
//! Rules mutate a synthesized [`Property`] in place. Applicable rules run in
//! ascending [`PropertyRule::order`]; when any applicable rule is exclusive,
//! only exclusive rules run and default synthesis is skipped for the field.

mod annotation;
mod default_value;

pub use annotation::AnnotationRule;
pub use default_value::DefaultValueRule;

use crate::annotations::AnnotationKind;
use crate::error::FormsResult;
use crate::shape::{FieldShape, ShapeRef, TypeShape};
use halforms_core::{NamingPolicy, Property};
use std::fmt;
use std::sync::Arc;

/// A field under synthesis and the type declaring it
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
	pub field: &'a FieldShape,
	/// Shape whose template is being built
	pub owner: &'a TypeShape,
	/// Identity of the owner, absent for synthetic entry shapes
	pub owner_ref: Option<ShapeRef>,
	pub naming: NamingPolicy,
}

impl FieldContext<'_> {
	/// Wire name of the field
	pub fn property_name(&self) -> String {
		self.naming.apply(&self.field.name)
	}
}

/// A step of the property pipeline
pub trait PropertyRule: Send + Sync {
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	fn order(&self) -> i32 {
		0
	}

	/// Exclusive rules replace default synthesis of the fields they apply to
	fn exclusive(&self) -> bool {
		false
	}

	fn applies_to(&self, ctx: &FieldContext<'_>) -> bool;

	fn apply(&self, ctx: &FieldContext<'_>, property: &mut Property) -> FormsResult<()>;
}

/// Returns false when an annotation keeps the field out of templates
pub fn should_include(field: &FieldShape) -> bool {
	!field.annotations.iter().any(|a| a.excludes_field())
}

/// Rules applicable to one field, sorted by order
pub struct Applicable<'r> {
	pub rules: Vec<&'r Arc<dyn PropertyRule>>,
	pub exclusive: bool,
}

impl Applicable<'_> {
	/// Runs the rules that take part in this pass
	pub fn apply(&self, ctx: &FieldContext<'_>, property: &mut Property) -> FormsResult<()> {
		for rule in self.rules.iter().filter(|r| !self.exclusive || r.exclusive()) {
			tracing::trace!(rule = rule.name(), field = %ctx.field.name, "Applying property rule");
			rule.apply(ctx, property)?;
		}
		Ok(())
	}
}

/// Ordered collection of property rules
#[derive(Clone, Default)]
pub struct RuleSet {
	rules: Vec<Arc<dyn PropertyRule>>,
}

impl fmt::Debug for RuleSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.rules.iter().map(|r| (r.name(), r.order(), r.exclusive())))
			.finish()
	}
}

impl RuleSet {
	pub fn empty() -> Self {
		Self::default()
	}

	/// One annotation rule per property-changing annotation kind
	pub fn builtin() -> Self {
		let mut rules = Self::empty();
		for kind in AnnotationKind::PROPERTY_RULES {
			rules.push(Arc::new(AnnotationRule::new(kind)));
		}
		rules
	}

	pub fn push(&mut self, rule: Arc<dyn PropertyRule>) {
		self.rules.push(rule);
	}

	pub fn with_rule(mut self, rule: impl PropertyRule + 'static) -> Self {
		self.push(Arc::new(rule));
		self
	}

	/// Removes the built-in rule of an annotation kind
	pub fn without(mut self, kind: AnnotationKind) -> Self {
		let name = AnnotationRule::name_for(kind);
		self.rules.retain(|r| r.name() != name);
		self
	}

	/// Moves the built-in rule of an annotation kind to another order
	pub fn with_order(mut self, kind: AnnotationKind, order: i32) -> Self {
		let name = AnnotationRule::name_for(kind);
		for rule in &mut self.rules {
			if rule.name() == name {
				*rule = Arc::new(AnnotationRule::new(kind).with_order(order));
			}
		}
		self
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Rules applicable to a field, stable sorted by order
	pub fn applicable(&self, ctx: &FieldContext<'_>) -> Applicable<'_> {
		let mut rules: Vec<_> = self.rules.iter().filter(|r| r.applies_to(ctx)).collect();
		rules.sort_by_key(|r| r.order());
		let exclusive = rules.iter().any(|r| r.exclusive());
		Applicable { rules, exclusive }
	}
}
