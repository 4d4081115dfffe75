// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document head tags that make the site installable as a web app.
//!
//! The tag list is a fixed table. [`PwaHead`] renders it straight into the
//! shell's `<head>` with attributes in table order, so the page carries exactly
//! what [`render_head_html`] produces.

use leptos::either::Either;
use leptos::prelude::*;
use std::fmt;

static HEAD_METADATA: [HeadTag; 9] = [
	HeadTag::Meta {
		name: "theme-color",
		content: "#0284c7",
	},
	HeadTag::Meta {
		name: "apple-mobile-web-app-capable",
		content: "yes",
	},
	HeadTag::Meta {
		name: "apple-mobile-web-app-status-bar-style",
		content: "default",
	},
	HeadTag::Meta {
		name: "apple-mobile-web-app-title",
		content: "GS Timetable",
	},
	HeadTag::Link(LinkTag {
		rel: "manifest",
		mime_type: None,
		sizes: None,
		href: "/site.webmanifest",
	}),
	HeadTag::Link(LinkTag {
		rel: "apple-touch-icon",
		mime_type: None,
		sizes: Some("180x180"),
		href: "/apple-touch-icon.png",
	}),
	HeadTag::Link(LinkTag {
		rel: "icon",
		mime_type: Some("image/png"),
		sizes: Some("64x64"),
		href: "/favicon-64.png",
	}),
	HeadTag::Link(LinkTag {
		rel: "icon",
		mime_type: Some("image/png"),
		sizes: Some("192x192"),
		href: "/icon-192.png",
	}),
	HeadTag::Link(LinkTag {
		rel: "icon",
		mime_type: Some("image/png"),
		sizes: Some("512x512"),
		href: "/icon-512.png",
	}),
];

/// The head tags emitted on every page, in output order.
pub fn head_metadata() -> &'static [HeadTag] {
	&HEAD_METADATA
}

/// Serializes every head tag as HTML, one element per line.
pub fn render_head_html() -> String {
	head_metadata()
		.iter()
		.map(|tag| tag.to_string())
		.collect::<Vec<_>>()
		.join("\n")
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagKind {
	Meta,
	Link,
}

impl TagKind {
	pub fn element_name(self) -> &'static str {
		match self {
			Self::Meta => "meta",
			Self::Link => "link",
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeadTag {
	Meta { name: &'static str, content: &'static str },
	Link(LinkTag),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LinkTag {
	pub rel: &'static str,
	pub mime_type: Option<&'static str>,
	pub sizes: Option<&'static str>,
	pub href: &'static str,
}

impl HeadTag {
	pub fn kind(&self) -> TagKind {
		match self {
			Self::Meta { .. } => TagKind::Meta,
			Self::Link(_) => TagKind::Link,
		}
	}

	/// Attribute name/value pairs in the order they are written out.
	pub fn attributes(&self) -> Vec<(&'static str, &'static str)> {
		match *self {
			Self::Meta { name, content } => vec![("name", name), ("content", content)],
			Self::Link(link) => {
				let mut attributes = vec![("rel", link.rel)];
				if let Some(mime_type) = link.mime_type {
					attributes.push(("type", mime_type));
				}
				if let Some(sizes) = link.sizes {
					attributes.push(("sizes", sizes));
				}
				attributes.push(("href", link.href));
				attributes
			}
		}
	}
}

impl fmt::Display for HeadTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<{}", self.kind().element_name())?;
		for (name, value) in self.attributes() {
			write!(f, " {}=\"", name)?;
			write_escaped_attribute(f, value)?;
			f.write_str("\"")?;
		}
		f.write_str(">")
	}
}

fn write_escaped_attribute(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
	for c in value.chars() {
		match c {
			'&' => f.write_str("&amp;")?,
			'"' => f.write_str("&quot;")?,
			'<' => f.write_str("&lt;")?,
			_ => write!(f, "{}", c)?,
		}
	}
	Ok(())
}

/// Writes the head tags as plain elements; belongs inside the shell's `<head>`.
#[component]
pub fn PwaHead() -> impl IntoView {
	head_metadata().iter().copied().map(head_tag_view).collect_view()
}

fn head_tag_view(tag: HeadTag) -> impl IntoView {
	match tag {
		HeadTag::Meta { name, content } => Either::Left(view! { <meta name=name content=content /> }),
		HeadTag::Link(link) => Either::Right(view! {
			<link rel=link.rel type=link.mime_type sizes=link.sizes href=link.href />
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXPECTED_HTML: &str = concat!(
		"<meta name=\"theme-color\" content=\"#0284c7\">\n",
		"<meta name=\"apple-mobile-web-app-capable\" content=\"yes\">\n",
		"<meta name=\"apple-mobile-web-app-status-bar-style\" content=\"default\">\n",
		"<meta name=\"apple-mobile-web-app-title\" content=\"GS Timetable\">\n",
		"<link rel=\"manifest\" href=\"/site.webmanifest\">\n",
		"<link rel=\"apple-touch-icon\" sizes=\"180x180\" href=\"/apple-touch-icon.png\">\n",
		"<link rel=\"icon\" type=\"image/png\" sizes=\"64x64\" href=\"/favicon-64.png\">\n",
		"<link rel=\"icon\" type=\"image/png\" sizes=\"192x192\" href=\"/icon-192.png\">\n",
		"<link rel=\"icon\" type=\"image/png\" sizes=\"512x512\" href=\"/icon-512.png\">",
	);

	#[test]
	fn renders_exact_tag_list() {
		assert_eq!(render_head_html(), EXPECTED_HTML);
	}

	#[test]
	fn rendering_is_idempotent() {
		let first = render_head_html();
		let second = render_head_html();
		assert_eq!(first, second);
		assert_eq!(head_metadata(), head_metadata());
	}

	#[test]
	fn has_four_meta_tags_then_five_links() {
		let kinds: Vec<TagKind> = head_metadata().iter().map(HeadTag::kind).collect();
		assert_eq!(kinds.len(), 9);
		assert!(kinds[..4].iter().all(|kind| *kind == TagKind::Meta));
		assert!(kinds[4..].iter().all(|kind| *kind == TagKind::Link));
	}

	#[test]
	fn meta_attributes_are_name_then_content() {
		let tags = head_metadata();
		assert_eq!(tags[0].attributes(), vec![("name", "theme-color"), ("content", "#0284c7")]);
		assert_eq!(
			tags[3].attributes(),
			vec![("name", "apple-mobile-web-app-title"), ("content", "GS Timetable")]
		);
	}

	#[test]
	fn link_attributes_skip_absent_values() {
		let tags = head_metadata();
		assert_eq!(
			tags[4].attributes(),
			vec![("rel", "manifest"), ("href", "/site.webmanifest")]
		);
		assert_eq!(
			tags[5].attributes(),
			vec![("rel", "apple-touch-icon"), ("sizes", "180x180"), ("href", "/apple-touch-icon.png")]
		);
		assert_eq!(
			tags[8].attributes(),
			vec![
				("rel", "icon"),
				("type", "image/png"),
				("sizes", "512x512"),
				("href", "/icon-512.png")
			]
		);
	}

	#[test]
	fn one_line_per_tag() {
		let html = render_head_html();
		assert_eq!(html.lines().count(), head_metadata().len());
		assert!(html.lines().all(|line| line.starts_with("<meta ") || line.starts_with("<link ")));
	}

	#[test]
	fn rendered_elements_match_serialized_tags() {
		for tag in head_metadata() {
			assert_eq!(head_tag_view(*tag).to_html(), tag.to_string());
		}
	}

	#[test]
	fn component_writes_every_tag_in_order() {
		let html = view! { <PwaHead /> }.to_html().replace("<!>", "");
		assert_eq!(html, EXPECTED_HTML.replace('\n', ""));
	}

	#[test]
	fn escapes_attribute_values() {
		let tag = HeadTag::Meta {
			name: "description",
			content: "a \"quoted\" <b> & more",
		};
		assert_eq!(
			tag.to_string(),
			"<meta name=\"description\" content=\"a &quot;quoted&quot; &lt;b> &amp; more\">"
		);
	}
}
