//! Listing extraction
//!
//! Upstream responses are parsed into a [`RawListingDocument`] and then probed
//! for the shapes we know about. Extraction never fails: a document that
//! matches no shape simply yields no programmes.

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::{SourceError, SourceResult};
use crate::models::LooseValue;
use crate::utils::xml_tree::{XmlElement, parse_document};

pub mod grid;
pub mod xml_shapes;

/// A parsed upstream response
#[derive(Debug, Clone, PartialEq)]
pub enum RawListingDocument {
    /// XML feed or XMLTV document
    Markup(XmlElement),
    /// Dated grid mapping, `{ "YYYY-MM-DD": [entry, ...] }`
    Grid(serde_json::Value),
}

impl RawListingDocument {
    /// Parse raw response bytes, detecting JSON vs XML from the content
    pub fn parse(bytes: &[u8]) -> SourceResult<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let content = bytes.trim_ascii_start();

        match content.first() {
            None => Err(SourceError::parse("listing", "empty document")),
            Some(b'{') | Some(b'[') => serde_json::from_slice(content)
                .map(Self::Grid)
                .map_err(|e| SourceError::parse("grid", format!("Invalid JSON: {e}"))),
            Some(_) => {
                let text = std::str::from_utf8(content)
                    .map_err(|e| SourceError::parse("xml", format!("Invalid UTF-8: {e}")))?;
                parse_document(text).map(Self::Markup)
            }
        }
    }

    /// Channel display name carried by a feed document, if any
    pub fn channel_display_name(&self) -> Option<String> {
        let Self::Markup(root) = self else {
            return None;
        };

        let channel = root
            .child("channel")
            .or_else(|| root.descendants().find(|e| e.name == "channel"))?;

        channel
            .child("display-name")
            .or_else(|| channel.child("title"))
            .map(XmlElement::trimmed_text)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Fields recovered from one XML programme candidate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupFields {
    pub start: Option<String>,
    pub stop: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Fields recovered from one grid entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFields {
    /// Epoch seconds
    pub start: Option<i64>,
    /// Epoch seconds
    pub stop: Option<i64>,
    pub title: Option<String>,
    pub episode_title: Option<String>,
    pub description: Option<String>,
    pub season: Option<LooseValue>,
    pub episode: Option<LooseValue>,
    pub rating: Option<String>,
}

/// Raw programme fields, tagged by the shape they were extracted from
#[derive(Debug, Clone, PartialEq)]
pub enum RawProgramFields {
    /// `<programme start=".." stop="..">`
    Programme(MarkupFields),
    /// Syndication feed `<item>`
    FeedItem(MarkupFields),
    /// Any `*program` / `*show` element
    Generic(MarkupFields),
    /// Dated grid entry
    Grid(GridFields),
}

impl RawProgramFields {
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Programme(f) | Self::FeedItem(f) | Self::Generic(f) => f.title.as_deref(),
            Self::Grid(f) => f.title.as_deref(),
        }
    }

    /// Whether the candidate carries a non-empty title
    pub fn has_title(&self) -> bool {
        self.title().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Programme(_) => "programme",
            Self::FeedItem(_) => "item",
            Self::Generic(_) => "generic",
            Self::Grid(_) => "grid",
        }
    }
}

/// Extract raw programme fields from a parsed document.
///
/// `window` lists the grid dates to read; it is ignored for XML documents.
pub fn extract(document: &RawListingDocument, window: &[NaiveDate]) -> Vec<RawProgramFields> {
    let programs = match document {
        RawListingDocument::Markup(root) => xml_shapes::extract(root),
        RawListingDocument::Grid(value) => grid::extract(value, window),
    };

    debug!(
        "Extracted {} raw programme candidates ({})",
        programs.len(),
        programs.first().map_or("none", RawProgramFields::shape_name)
    );
    programs
}
