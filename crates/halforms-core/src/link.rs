//! HAL links
//!
//! A link's `href` is either a URI or a URI template; `templated` is set
//! whenever the href contains a template expression.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Relation name of the link pointing at the resource itself
pub const SELF_RELATION: &str = "self";

/// A hypermedia link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LinkRepr")]
pub struct Link {
	pub href: String,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub templated: bool,
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub media_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deprecation: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hreflang: Option<String>,
}

/// Wire shape of [`Link`] before the `templated` invariant is applied
#[derive(Deserialize)]
struct LinkRepr {
	href: String,
	#[serde(default)]
	templated: bool,
	#[serde(rename = "type", default)]
	media_type: Option<String>,
	#[serde(default)]
	deprecation: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	profile: Option<String>,
	#[serde(default)]
	title: Option<String>,
	#[serde(default)]
	hreflang: Option<String>,
}

impl From<LinkRepr> for Link {
	fn from(repr: LinkRepr) -> Self {
		let templated = repr.templated || is_uri_template(&repr.href);
		Self {
			href: repr.href,
			templated,
			media_type: repr.media_type,
			deprecation: repr.deprecation,
			name: repr.name,
			profile: repr.profile,
			title: repr.title,
			hreflang: repr.hreflang,
		}
	}
}

fn is_uri_template(href: &str) -> bool {
	href.contains('{')
}

impl Link {
	/// Creates a link, marking it templated when the href is a URI template
	///
	/// # Examples
	///
	/// ```
	/// use halforms_core::Link;
	///
	/// assert!(!Link::new("/orders/1").templated);
	/// assert!(Link::new("/orders{?page}").templated);
	/// ```
	pub fn new(href: impl Into<String>) -> Self {
		let href = href.into();
		Self {
			templated: is_uri_template(&href),
			href,
			media_type: None,
			deprecation: None,
			name: None,
			profile: None,
			title: None,
			hreflang: None,
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_type = Some(media_type.into());
		self
	}

	pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
		self.profile = Some(profile.into());
		self
	}

	pub fn with_hreflang(mut self, hreflang: impl Into<String>) -> Self {
		self.hreflang = Some(hreflang.into());
		self
	}

	pub fn with_deprecation(mut self, deprecation: impl Into<String>) -> Self {
		self.deprecation = Some(deprecation.into());
		self
	}

	/// Forces the templated flag; a href with a template expression stays templated
	pub fn templated(mut self, templated: bool) -> Self {
		self.templated = templated || is_uri_template(&self.href);
		self
	}
}

/// Links of a resource keyed by relation
///
/// Every relation maps to a non-empty, ordered list of links.
pub type Links = IndexMap<String, Vec<Link>>;

/// Appends a link under `rel`, creating the relation on first use
pub fn push_link(links: &mut Links, rel: impl Into<String>, link: Link) {
	links.entry(rel.into()).or_default().push(link);
}
