//! Caches shared by synthesis calls
//!
//! Both caches are first-writer-wins: concurrent callers may compute the
//! same entry twice, but every caller observes the value stored first.

use halforms_core::FormTemplate;
use parking_lot::RwLock;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;

/// Key of a synthesized whole-type template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
	pub type_id: TypeId,
	pub method: String,
	pub title: Option<String>,
	pub content_type: String,
}

/// Store of synthesized templates
pub trait TemplateCache: Send + Sync {
	fn get(&self, key: &TemplateKey) -> Option<FormTemplate>;

	/// Stores `template` unless an entry exists; returns the stored entry
	fn get_or_insert(&self, key: TemplateKey, template: FormTemplate) -> FormTemplate;

	fn clear(&self);
}

/// Store of default instances keyed by type; `None` memoizes a failed
/// construction.
pub trait DefaultValueCache: Send + Sync {
	/// `None` when nothing is memoized for the type
	fn get(&self, type_id: TypeId) -> Option<Option<Value>>;

	fn get_or_insert(&self, type_id: TypeId, value: Option<Value>) -> Option<Value>;

	fn clear(&self);
}

/// [`TemplateCache`] kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryTemplateCache {
	entries: RwLock<HashMap<TemplateKey, FormTemplate>>,
}

impl InMemoryTemplateCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl TemplateCache for InMemoryTemplateCache {
	fn get(&self, key: &TemplateKey) -> Option<FormTemplate> {
		self.entries.read().get(key).cloned()
	}

	fn get_or_insert(&self, key: TemplateKey, template: FormTemplate) -> FormTemplate {
		self.entries.write().entry(key).or_insert(template).clone()
	}

	fn clear(&self) {
		self.entries.write().clear();
	}
}

/// [`DefaultValueCache`] kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryDefaultValueCache {
	entries: RwLock<HashMap<TypeId, Option<Value>>>,
}

impl InMemoryDefaultValueCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl DefaultValueCache for InMemoryDefaultValueCache {
	fn get(&self, type_id: TypeId) -> Option<Option<Value>> {
		self.entries.read().get(&type_id).cloned()
	}

	fn get_or_insert(&self, type_id: TypeId, value: Option<Value>) -> Option<Value> {
		self.entries.write().entry(type_id).or_insert(value).clone()
	}

	fn clear(&self) {
		self.entries.write().clear();
	}
}

/// Cache that stores nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTemplateCache;

impl TemplateCache for NoTemplateCache {
	fn get(&self, _key: &TemplateKey) -> Option<FormTemplate> {
		None
	}

	fn get_or_insert(&self, _key: TemplateKey, template: FormTemplate) -> FormTemplate {
		template
	}

	fn clear(&self) {}
}
