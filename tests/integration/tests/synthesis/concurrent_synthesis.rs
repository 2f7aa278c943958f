//! Integration tests for synthesis shared across threads
//!
//! One generator and its caches serve many threads; every thread must see
//! the same template and default instances are built once.

use halforms::prelude::*;
use halforms_forms::cache::{InMemoryDefaultValueCache, InMemoryTemplateCache};
use halforms_integration_tests::{Order, order_generator, sample_order};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

static TICKET_DEFAULTS: AtomicUsize = AtomicUsize::new(0);

struct Ticket;

impl Dto for Ticket {
	fn shape() -> TypeShape {
		TypeShape::new("Ticket")
			.field(FieldShape::of::<String>("Status").annotate(Annotation::Editable(false)))
			.with_default_factory(|| {
				TICKET_DEFAULTS.fetch_add(1, Ordering::SeqCst);
				Ok(serde_json::json!({"status": "open"}))
			})
	}
}

#[rstest]
fn test_threads_share_one_template() {
	let cache = Arc::new(InMemoryTemplateCache::new());
	let generator = order_generator().with_template_cache(cache.clone());

	let templates: Vec<FormTemplate> = thread::scope(|scope| {
		let handles: Vec<_> = (0..8)
			.map(|_| scope.spawn(|| generator.synthesize::<Order>("PUT", None, None).unwrap()))
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert!(templates.windows(2).all(|pair| pair[0] == pair[1]));
	assert_eq!(cache.len(), 1);
}

#[rstest]
fn test_threads_fill_independently() {
	let generator = order_generator();
	let template = generator.synthesize::<Order>("PUT", None, None).unwrap();

	thread::scope(|scope| {
		for id in 0..4_i64 {
			let generator = &generator;
			let template = &template;
			scope.spawn(move || {
				let order = Order {
					id,
					..sample_order()
				};
				let filled = generator.fill(template, &order).unwrap();
				assert_eq!(filled.property("id").unwrap().value, Some(serde_json::json!(id)));
			});
		}
	});
}

#[rstest]
fn test_default_instance_built_once() {
	let defaults = Arc::new(InMemoryDefaultValueCache::new());
	let generator = TemplateGenerator::new()
		.with_default_value_cache(defaults.clone())
		.with_template_cache(Arc::new(halforms_forms::NoTemplateCache));

	thread::scope(|scope| {
		for _ in 0..4 {
			scope.spawn(|| {
				let template = generator.synthesize::<Ticket>("POST", None, None).unwrap();
				assert_eq!(
					template.property("status").unwrap().value,
					Some(serde_json::json!("open"))
				);
			});
		}
	});

	assert_eq!(defaults.len(), 1);
	// concurrent first calls may race, later calls always hit the cache
	let built = TICKET_DEFAULTS.load(Ordering::SeqCst);
	generator.synthesize::<Ticket>("POST", None, None).unwrap();
	assert_eq!(TICKET_DEFAULTS.load(Ordering::SeqCst), built);
}
