//! Member naming policies
//!
//! The same policy names state members on the wire, form property names,
//! `valueField` / `promptField` of foreign-key options and extension keys.

use serde::{Deserialize, Serialize};

/// Policy used to turn declared field names into wire names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
	/// `first_name` / `FirstName` become `firstName`
	#[default]
	CamelCase,
	/// `firstName` / `FirstName` become `first_name`
	SnakeCase,
	/// `first_name` / `firstName` become `FirstName`
	PascalCase,
	/// `first_name` / `firstName` become `first-name`
	KebabCase,
	/// Names are emitted as declared
	Preserve,
}

impl NamingPolicy {
	/// Converts a declared name according to the policy
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::NamingPolicy;
	///
	/// assert_eq!(NamingPolicy::CamelCase.apply("category_id"), "categoryId");
	/// assert_eq!(NamingPolicy::CamelCase.apply("CategoryId"), "categoryId");
	/// assert_eq!(NamingPolicy::SnakeCase.apply("CategoryId"), "category_id");
	/// assert_eq!(NamingPolicy::Preserve.apply("Category_Id"), "Category_Id");
	/// ```
	pub fn apply(&self, name: &str) -> String {
		match self {
			NamingPolicy::Preserve => name.to_string(),
			NamingPolicy::CamelCase => join_words(&split_words(name), false, ""),
			NamingPolicy::PascalCase => join_words(&split_words(name), true, ""),
			NamingPolicy::SnakeCase => lower_words(&split_words(name), "_"),
			NamingPolicy::KebabCase => lower_words(&split_words(name), "-"),
		}
	}
}

/// Splits an identifier into words on `_`, `-`, spaces and case boundaries.
///
/// Runs of capitals are kept together (`HTMLBody` -> `HTML`, `Body`).
fn split_words(name: &str) -> Vec<String> {
	let chars: Vec<char> = name.chars().collect();
	let mut words = Vec::new();
	let mut current = String::new();

	for (i, &c) in chars.iter().enumerate() {
		if c == '_' || c == '-' || c == ' ' {
			if !current.is_empty() {
				words.push(std::mem::take(&mut current));
			}
			continue;
		}
		if c.is_uppercase() && !current.is_empty() {
			let prev = chars[i - 1];
			let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
			if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
				words.push(std::mem::take(&mut current));
			}
		}
		current.push(c);
	}
	if !current.is_empty() {
		words.push(current);
	}
	words
}

fn join_words(words: &[String], capitalize_first: bool, separator: &str) -> String {
	words
		.iter()
		.enumerate()
		.map(|(i, word)| {
			let lower = word.to_lowercase();
			if i == 0 && !capitalize_first {
				lower
			} else {
				capitalize(&lower)
			}
		})
		.collect::<Vec<_>>()
		.join(separator)
}

fn lower_words(words: &[String], separator: &str) -> String {
	words
		.iter()
		.map(|w| w.to_lowercase())
		.collect::<Vec<_>>()
		.join(separator)
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Reduces a name to its case- and separator-insensitive form
pub fn normalize_key(name: &str) -> String {
	name.chars()
		.filter(|c| *c != '_' && *c != '-')
		.flat_map(char::to_lowercase)
		.collect()
}

/// Returns true when a wire key designates the declared name.
///
/// Matching is exact first, then through the policy, then case-insensitive
/// with separators ignored.
pub fn key_matches(key: &str, declared: &str, policy: NamingPolicy) -> bool {
	key == declared || key == policy.apply(declared) || normalize_key(key) == normalize_key(declared)
}

/// Finds the member designated by `declared` in an iterator of keys,
/// preferring an exact match over the lenient ones.
pub fn find_key<'a, I>(keys: I, declared: &str, policy: NamingPolicy) -> Option<&'a str>
where
	I: IntoIterator<Item = &'a String>,
{
	let keys: Vec<&'a String> = keys.into_iter().collect();
	if let Some(exact) = keys.iter().copied().find(|k| k.as_str() == declared) {
		return Some(exact.as_str());
	}
	let renamed = policy.apply(declared);
	if let Some(by_policy) = keys.iter().copied().find(|k| **k == renamed) {
		return Some(by_policy.as_str());
	}
	let normalized = normalize_key(declared);
	keys.into_iter()
		.find(|k| normalize_key(k) == normalized)
		.map(|k| k.as_str())
}
