//! Integration tests for HAL-Forms documents
//!
//! Generates forms resources for the sample domain, writes them as JSON and
//! reads them back into typed state.

use assert_json_diff::assert_json_eq;
use halforms::prelude::*;
use halforms::{DynamicState, HalResult, HalSerializer, StateBinder};
use halforms_integration_tests::{Customer, Order, OrderLine, OrderStatus, resource_generator, sample_order};
use proptest::prelude::*;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::collections::BTreeMap;

#[fixture]
fn document() -> Value {
	let request = FormRequest::new("PUT")
		.with_title("Edit order")
		.with_target(LinkTarget::route("order-detail"))
		.with_self(LinkTarget::route("order-detail"))
		.with_param("id", 42);
	let resource = resource_generator().generate(&sample_order(), &request).unwrap();
	HalSerializer::default().forms_to_value(&resource).unwrap()
}

#[rstest]
fn test_member_order(document: Value) {
	let keys: Vec<&str> = document.as_object().unwrap().keys().map(String::as_str).collect();
	assert_eq!(
		keys,
		[
			"id",
			"number",
			"status",
			"placedAt",
			"customerId",
			"customer",
			"lines",
			"attributes",
			"notes",
			"timestamp",
			"_templates",
			"_links"
		]
	);
	assert_json_eq!(document["_links"], json!({"self": [{"href": "/api/orders/42"}]}));
	// nested members follow the naming policy, map keys stay as written
	assert_eq!(document["lines"][0]["unitPrice"], json!(1200.5));
	assert!(document["lines"][0].get("unit_price").is_none());
	assert_eq!(document["attributes"], json!({"gift": "yes"}));
}

#[rstest]
fn test_template_members(document: Value) {
	let template = &document["_templates"]["default"];
	assert_eq!(template["method"], json!("PUT"));
	assert_eq!(template["title"], json!("Edit order"));
	assert_eq!(template["target"], json!("/api/orders/42"));
	assert!(template.get("contentType").is_none());

	let status = &template["properties"][2];
	assert_json_eq!(
		status,
		json!({
			"name": "status",
			"required": true,
			"options": {
				"inline": [
					{"prompt": "Draft", "value": 0},
					{"prompt": "Placed", "value": 1},
					{"prompt": "Shipped", "value": 2}
				],
				"minItems": 1,
				"maxItems": 1,
				"selectedValues": [1]
			}
		})
	);
}

#[rstest]
fn test_read_back_typed(document: Value) {
	let written = document.clone();
	let forms: FormsResource<Order> = HalSerializer::default().forms_from_value(document).unwrap();

	assert_eq!(forms.state(), Some(&sample_order()));
	assert_eq!(forms.links_for("self")[0].href, "/api/orders/42");
	let template = forms.default_template().unwrap();
	assert_json_eq!(serde_json::to_value(template).unwrap(), written["_templates"]["default"]);
}

#[rstest]
fn test_read_back_dynamic(document: Value) {
	let forms: FormsResource = HalSerializer::default().forms_from_value(document).unwrap();
	let state: &DynamicState = forms.state().unwrap();
	assert_eq!(state["number"], json!("SO-0042"));
	assert!(!state.contains_key("_templates"));
}

#[rstest]
fn test_document_without_templates_rejected() {
	let result: HalResult<FormsResource> =
		HalSerializer::default().forms_from_value(json!({"number": "SO-1", "_links": {}}));
	assert!(matches!(result, Err(HalError::InvalidTemplates)));
}

/// Order lines bound through a constructor taking wire names
#[rstest]
fn test_constructor_binding() {
	let binder = StateBinder::<OrderLine>::new().constructor(&["product", "quantity"], |bag| {
		Ok(OrderLine {
			product: bag
				.get("product")
				.and_then(Value::as_str)
				.ok_or("product")?
				.to_string(),
			quantity: bag
				.get("quantity")
				.and_then(Value::as_u64)
				.and_then(|q| u32::try_from(q).ok())
				.ok_or("quantity")?,
			unit_price: 0.0,
		})
	});
	let resource: Resource<OrderLine> = HalSerializer::default()
		.from_value_with(json!({"Product": "Gears", "quantity": 3, "unitPrice": 2.5}), &binder)
		.unwrap();
	assert_eq!(
		resource.state,
		Some(OrderLine {
			product: "Gears".to_string(),
			quantity: 3,
			unit_price: 2.5,
		})
	);
}

fn status() -> impl Strategy<Value = OrderStatus> {
	prop_oneof![
		Just(OrderStatus::Draft),
		Just(OrderStatus::Placed),
		Just(OrderStatus::Shipped)
	]
}

fn order() -> impl Strategy<Value = Order> {
	(
		any::<i64>(),
		"[A-Z]{2}-[0-9]{4}",
		status(),
		proptest::option::of("[a-z ]{0,20}"),
		proptest::collection::vec(("[a-z]{1,10}", 1u32..100, 0u32..10_000), 0..3),
	)
		.prop_map(|(id, number, status, notes, lines)| Order {
			id,
			number,
			status,
			customer_id: id.wrapping_add(1),
			customer: (id % 2 == 0).then(|| Customer {
				id,
				name: "Ada".to_string(),
				email: "ada@example.com".to_string(),
			}),
			lines: lines
				.into_iter()
				.map(|(product, quantity, cents)| OrderLine {
					product,
					quantity,
					unit_price: f64::from(cents) / 100.0,
				})
				.collect(),
			attributes: BTreeMap::new(),
			notes,
			..Order::default()
		})
}

proptest! {
	/// Test: Forms resources survive a write and read with typed state
	/// Category: Property
	#[test]
	fn prop_forms_round_trip(order in order()) {
		let request = FormRequest::new("PUT").with_self(LinkTarget::route("orders"));
		let resource = resource_generator().generate(&order, &request).unwrap();
		let serializer = HalSerializer::default();
		let json = serializer.forms_to_string(&resource).unwrap();
		let read: FormsResource<Order> = serializer.forms_from_str(&json).unwrap();
		prop_assert_eq!(read.state(), Some(&order));
		prop_assert_eq!(read.templates.len(), 1);
	}
}
