//! Value domains of form properties
//!
//! [`Options`] replaces a free-form `type` on a property: either a fixed list
//! of inline choices or an external, link-backed source of choices.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inline choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineOption {
	pub prompt: String,
	pub value: Value,
}

impl InlineOption {
	pub fn new(prompt: impl Into<String>, value: impl Into<Value>) -> Self {
		Self {
			prompt: prompt.into(),
			value: value.into(),
		}
	}
}

/// External source of choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsLink {
	pub href: String,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub templated: bool,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub media_type: Option<String>,
}

impl OptionsLink {
	pub fn new(href: impl Into<String>) -> Self {
		let href = href.into();
		Self {
			templated: href.contains('{'),
			href,
			media_type: None,
		}
	}
}

impl From<crate::Link> for OptionsLink {
	fn from(link: crate::Link) -> Self {
		Self {
			href: link.href,
			templated: link.templated,
			media_type: link.media_type,
		}
	}
}

/// Value domain descriptor of a property
///
/// `max_items == None` means the selection is unbounded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub inline: Vec<InlineOption>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link: Option<OptionsLink>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value_field: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prompt_field: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_items: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_items: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub selected_values: Vec<Value>,
}

impl Options {
	/// Creates options backed by a fixed list of choices
	pub fn inline(inline: Vec<InlineOption>) -> Self {
		Self {
			inline,
			..Default::default()
		}
	}

	/// Creates options backed by an external link
	pub fn linked(link: OptionsLink) -> Self {
		Self {
			link: Some(link),
			..Default::default()
		}
	}

	/// True when more than one value may be selected
	pub fn is_multi_select(&self) -> bool {
		self.max_items.is_none_or(|max| max > 1)
	}

	/// Finds the inline choice whose prompt equals `prompt`
	pub fn inline_by_prompt(&self, prompt: &str) -> Option<&InlineOption> {
		self.inline.iter().find(|o| o.prompt == prompt)
	}

	/// Adds a value to the selection, ignoring duplicates
	pub fn select(&mut self, value: Value) {
		if !self.selected_values.contains(&value) {
			self.selected_values.push(value);
		}
	}
}
