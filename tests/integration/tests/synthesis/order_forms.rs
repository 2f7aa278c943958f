//! Integration tests for order form synthesis
//!
//! Synthesizes and fills the templates of the sample order domain through
//! the facade crate and checks the resulting HAL-Forms properties.

use halforms::prelude::*;
use halforms::{CyclePolicy, FormsError};
use halforms_integration_tests::{Employee, Order, order_generator, resource_generator, sample_order};
use rstest::{fixture, rstest};
use serde_json::{Number, json};

#[fixture]
fn template() -> FormTemplate {
	order_generator().synthesize::<Order>("PUT", Some("Edit order"), None).unwrap()
}

#[rstest]
fn test_property_order(template: FormTemplate) {
	let names: Vec<&str> = template.properties.iter().map(|p| p.name.as_str()).collect();
	assert_eq!(
		names,
		[
			"id",
			"number",
			"status",
			"placedAt",
			"customerId",
			"lines",
			"attributes",
			"notes",
			"timestamp"
		]
	);
}

#[rstest]
fn test_scalar_properties(template: FormTemplate) {
	let placed_at = template.property("placedAt").unwrap();
	assert_eq!(placed_at.property_type(), Some(PropertyType::DatetimeOffset));
	assert!(!placed_at.required);

	let notes = template.property("notes").unwrap();
	assert_eq!(notes.property_type(), Some(PropertyType::Textarea));
	assert_eq!(notes.max_length, Some(500));

	let timestamp = template.property("timestamp").unwrap();
	assert_eq!(timestamp.property_type(), Some(PropertyType::Hidden));
	assert_eq!(timestamp.value, Some(json!([])));

	let number = template.property("number").unwrap();
	assert!(number.read_only);
	assert_eq!(number.value, Some(json!("NEW")));
}

#[rstest]
fn test_choice_properties(template: FormTemplate) {
	let status = template.property("status").unwrap().options().unwrap();
	let prompts: Vec<&str> = status.inline.iter().map(|o| o.prompt.as_str()).collect();
	assert_eq!(prompts, ["Draft", "Placed", "Shipped"]);
	assert_eq!((status.min_items, status.max_items), (Some(1), Some(1)));

	let customer = template.property("customerId").unwrap();
	assert_eq!(customer.prompt.as_deref(), Some("Customer"));
	assert_eq!(customer.property_type(), None);
	let options = customer.options().unwrap();
	assert_eq!(options.link.as_ref().unwrap().href, "/api/customers");
	assert_eq!(options.value_field.as_deref(), Some("id"));
	assert_eq!(options.prompt_field.as_deref(), Some("name"));
}

#[rstest]
fn test_nested_properties(template: FormTemplate) {
	let lines = template.property("lines").unwrap();
	assert_eq!(lines.property_type(), Some(PropertyType::Collection));
	let line = lines.default_template().unwrap();
	let quantity = line.property("quantity").unwrap();
	assert_eq!(quantity.min, Number::from_f64(1.0));
	assert_eq!(quantity.max, Number::from_f64(999.0));
	assert_eq!(line.property("unitPrice").unwrap().property_type(), Some(PropertyType::Currency));
	assert_eq!(line.property("product").unwrap().max_length, Some(80));

	let attributes = template.property("attributes").unwrap().default_template().unwrap();
	let entry: Vec<&str> = attributes.properties.iter().map(|p| p.name.as_str()).collect();
	assert_eq!(entry, ["key", "value"]);
	assert!(attributes.property("key").unwrap().required);
}

#[rstest]
fn test_filled_edit_form(template: FormTemplate) {
	let filled = order_generator().fill(&template, &sample_order()).unwrap();

	assert_eq!(filled.property("id").unwrap().value, Some(json!(42)));
	assert_eq!(filled.property("number").unwrap().value, Some(json!("SO-0042")));
	assert_eq!(filled.property("notes").unwrap().value, None);
	assert_eq!(
		filled.property("status").unwrap().options().unwrap().selected_values,
		[json!(1)]
	);
	assert_eq!(
		filled.property("customerId").unwrap().options().unwrap().selected_values,
		[json!(7)]
	);

	let lines = filled.property("lines").unwrap().templates.as_ref().unwrap();
	assert_eq!(lines.len(), 3);
	assert_eq!(lines["1"].property("quantity").unwrap().value, Some(json!(500)));

	let attributes = filled.property("attributes").unwrap().templates.as_ref().unwrap();
	assert_eq!(attributes["0"].property("key").unwrap().value, Some(json!("gift")));

	// filling works on a copy
	assert_eq!(template.property("id").unwrap().value, Some(json!(0)));
	assert_eq!(template.property("lines").unwrap().templates.as_ref().unwrap().len(), 1);
}

#[rstest]
fn test_generated_resource() {
	let request = FormRequest::new("PUT")
		.with_target(LinkTarget::route("order-detail"))
		.with_self(LinkTarget::route("order-detail"))
		.with_param("id", 42);
	let resource = resource_generator().generate(&sample_order(), &request).unwrap();

	assert_eq!(resource.links_for("self")[0].href, "/api/orders/42");
	let template = resource.default_template().unwrap();
	assert_eq!(template.target.as_deref(), Some("/api/orders/42"));
	assert_eq!(resource.state().unwrap()["number"], json!("SO-0042"));
}

#[rstest]
fn test_self_reference_truncated() {
	let template = TemplateGenerator::new().synthesize::<Employee>("POST", None, None).unwrap();
	let manager = template.property("manager").unwrap();
	assert_eq!(manager.property_type(), Some(PropertyType::Object));
	assert!(manager.default_template().unwrap().properties.is_empty());
}

#[rstest]
fn test_self_reference_rejected() {
	let mut settings = HalSettings::default();
	settings.forms.cycle_policy = CyclePolicy::Error;
	let result = TemplateGenerator::from_settings(&settings).synthesize::<Employee>("POST", None, None);
	match result {
		Err(FormsError::CyclicShape { type_name, path }) => {
			assert!(type_name.ends_with("Employee"));
			assert_eq!(path.matches("Employee").count(), 2);
		}
		other => panic!("expected a cyclic shape error, got {other:?}"),
	}
}
