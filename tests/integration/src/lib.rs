//! Integration test utilities for halforms
//!
//! Shared DTOs of a small order-management domain, registered the way a
//! host application registers them, plus ready-made generators.

use chrono::{DateTime, Utc};
use halforms_forms::{
	Annotation, DataTypeHint, Display, Dto, DtoEnum, EnumShape, FieldShape, FormsResourceGenerator, LinkTarget,
	PatternLinkResolver, RouteLinkFactory, TemplateGenerator, TypeRef, TypeShape,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
	Draft = 0,
	Placed = 1,
	Shipped = 2,
}

impl DtoEnum for OrderStatus {
	fn enum_shape() -> EnumShape {
		EnumShape::new("OrderStatus")
			.member("Draft", OrderStatus::Draft as i64)
			.member("Placed", OrderStatus::Placed as i64)
			.member("Shipped", OrderStatus::Shipped as i64)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
	pub id: i64,
	pub name: String,
	pub email: String,
}

impl Dto for Customer {
	fn shape() -> TypeShape {
		TypeShape::new("Customer")
			.field(FieldShape::of::<i64>("Id").key())
			.field(FieldShape::of::<String>("Name").display(Display::named("Full name")))
			.field(FieldShape::of::<String>("Email").annotate(Annotation::DataType(DataTypeHint::EmailAddress)))
			.display_column("Name")
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
	pub product: String,
	pub quantity: u32,
	pub unit_price: f64,
}

impl Dto for OrderLine {
	fn shape() -> TypeShape {
		TypeShape::new("OrderLine")
			.field(FieldShape::of::<String>("Product").max_length(80))
			.field(FieldShape::of::<u32>("Quantity").annotate(Annotation::range(1, 999)))
			.field(FieldShape::of::<f64>("UnitPrice").annotate(Annotation::DataType(DataTypeHint::Currency)))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	pub id: i64,
	pub number: String,
	pub status: OrderStatus,
	pub placed_at: Option<DateTime<Utc>>,
	pub customer_id: i64,
	pub customer: Option<Customer>,
	pub lines: Vec<OrderLine>,
	pub attributes: BTreeMap<String, String>,
	pub notes: Option<String>,
	pub timestamp: Vec<u8>,
}

impl Default for Order {
	fn default() -> Self {
		Self {
			id: 0,
			number: "NEW".to_string(),
			status: OrderStatus::Draft,
			placed_at: None,
			customer_id: 0,
			customer: None,
			lines: Vec::new(),
			attributes: BTreeMap::new(),
			notes: None,
			timestamp: Vec::new(),
		}
	}
}

impl Dto for Order {
	fn shape() -> TypeShape {
		TypeShape::new("Order")
			.field(FieldShape::of::<i64>("Id").display(Display::default().with_order(-1)))
			.field(FieldShape::of::<String>("Number").annotate(Annotation::Editable(false)))
			.field(FieldShape::enumeration::<OrderStatus>("Status"))
			.field(FieldShape::of::<Option<DateTime<Utc>>>("PlacedAt"))
			.field(FieldShape::of::<i64>("CustomerId").prompt("Customer"))
			.field(FieldShape::new("Customer", TypeRef::optional(TypeRef::object::<Customer>())).ignore())
			.field(FieldShape::new("Lines", TypeRef::list(TypeRef::object::<OrderLine>())))
			.field(FieldShape::of::<BTreeMap<String, String>>("Attributes"))
			.field(
				FieldShape::of::<Option<String>>("Notes")
					.annotate(Annotation::UiHint("textarea".to_string()))
					.max_length(500),
			)
			.field(FieldShape::of::<Vec<u8>>("Timestamp").annotate(Annotation::Timestamp))
			.with_default::<Order>()
	}
}

/// An employee reporting to another employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
	pub name: String,
	pub manager: Option<Box<Employee>>,
}

impl Dto for Employee {
	fn shape() -> TypeShape {
		TypeShape::new("Employee")
			.field(FieldShape::of::<String>("Name"))
			.field(FieldShape::new("Manager", TypeRef::optional(TypeRef::object::<Employee>())))
	}
}

pub fn sample_order() -> Order {
	Order {
		id: 42,
		number: "SO-0042".to_string(),
		status: OrderStatus::Placed,
		placed_at: DateTime::parse_from_rfc3339("2024-03-01T09:30:00Z")
			.ok()
			.map(|t| t.with_timezone(&Utc)),
		customer_id: 7,
		customer: Some(Customer {
			id: 7,
			name: "Ada Lovelace".to_string(),
			email: "ada@example.com".to_string(),
		}),
		lines: vec![
			OrderLine {
				product: "Analytical engine".to_string(),
				quantity: 1,
				unit_price: 1200.5,
			},
			OrderLine {
				product: "Punch cards".to_string(),
				quantity: 500,
				unit_price: 0.25,
			},
		],
		attributes: BTreeMap::from([("gift".to_string(), "yes".to_string())]),
		notes: None,
		timestamp: vec![0, 0, 0, 1],
	}
}

/// Routes of the sample domain
pub fn resolver() -> PatternLinkResolver {
	PatternLinkResolver::new()
		.route("customers", "/api/customers")
		.route("order-detail", "/api/orders/{id}")
		.route("orders", "/api/orders")
}

/// Generator resolving customer foreign keys to the customers listing
pub fn order_generator() -> TemplateGenerator {
	let factory = RouteLinkFactory::new(Arc::new(resolver()))
		.route::<Customer>(LinkTarget::route("customers").with_type("application/hal+json"));
	TemplateGenerator::new().with_link_factory(Arc::new(factory))
}

pub fn resource_generator() -> FormsResourceGenerator {
	FormsResourceGenerator::new(order_generator(), Arc::new(resolver()))
}
