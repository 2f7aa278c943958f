//! Integration tests for settings loaded from TOML files
//!
//! Settings drive both the document serializer and template synthesis.

use halforms::prelude::*;
use halforms::{CyclePolicy, FormsError, HalSerializer, IgnoreCondition};
use halforms_integration_tests::{Employee, Order, sample_order};
use rstest::rstest;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn settings_file(contents: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

#[rstest]
fn test_snake_case_documents() {
	let file = settings_file(
		r#"
		naming_policy = "snake_case"
		ignore_condition = "when_null"
		"#,
	);
	let settings = HalSettings::from_toml_file(file.path()).unwrap();
	assert_eq!(settings.ignore_condition, IgnoreCondition::WhenNull);

	let serializer = HalSerializer::new(settings.serializer_options());
	let resource = Resource::new(sample_order()).with_self_link("/api/orders/42");
	let document = serializer.to_value(&resource).unwrap();
	assert_eq!(document["placed_at"], json!("2024-03-01T09:30:00Z"));
	assert!(document.get("notes").is_none());

	let read: Resource<Order> = serializer.from_value(document).unwrap();
	assert_eq!(read.state, Some(sample_order()));
}

#[rstest]
fn test_synthesis_settings() {
	let file = settings_file(
		r#"
		naming_policy = "pascal_case"

		[forms]
		default_method = "POST"
		default_content_type = "application/x-www-form-urlencoded"
		cycle_policy = "error"
		"#,
	);
	let settings = HalSettings::from_toml_file(file.path()).unwrap();
	let generator = TemplateGenerator::from_settings(&settings);

	let template = generator.synthesize::<Order>(&settings.forms.default_method, None, None).unwrap();
	assert_eq!(template.method, "POST");
	assert_eq!(template.content_type, "application/x-www-form-urlencoded");
	assert!(template.property("PlacedAt").is_some());

	let result = generator.synthesize::<Employee>("POST", None, None);
	assert!(matches!(result, Err(FormsError::CyclicShape { .. })));
	assert_eq!(settings.forms.cycle_policy, CyclePolicy::Error);
}

#[rstest]
fn test_missing_file() {
	let result = HalSettings::from_toml_file("/nonexistent/halforms.toml");
	assert!(matches!(result, Err(HalError::Settings(message)) if message.contains("halforms.toml")));
}
