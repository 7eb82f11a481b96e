//! Channel descriptor loading
//!
//! Two input formats are accepted: a JSON array of descriptor objects, or an
//! XML channel list of the form
//! `<channels><channel lang=".." xmltv_id=".." site_id="..">Name</channel></channels>`.

use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::{debug, warn};

use super::LooseValue;
use crate::errors::{AppError, AppResult};
use crate::utils::xml_tree::{XmlElement, parse_document};

/// Identifying parameters for one upstream channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSource {
    pub name: Option<String>,
    pub language: Option<String>,
    /// Raw site or channel id as configured
    pub site_id: String,
    /// Canonical XMLTV id, preferred over `site_id` when present
    pub xmltv_id: Option<String>,
    pub lineup: GridLineup,
}

/// Lineup parameters the grid provider needs for a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLineup {
    pub device: Option<String>,
    pub lineup_id: Option<String>,
    pub headend_id: Option<String>,
    pub country: Option<String>,
    pub postal: Option<String>,
    pub prgsvcid: Option<String>,
}

impl ChannelSource {
    /// The XMLTV channel identifier this source resolves to
    pub fn xmltv_id(&self) -> &str {
        self.xmltv_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.site_id)
    }

    /// Program service id sent to the grid provider
    pub fn program_service_id(&self) -> &str {
        self.lineup.prgsvcid.as_deref().unwrap_or(&self.site_id)
    }

    /// Human label for logs
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.xmltv_id())
    }
}

#[derive(Debug, Deserialize)]
struct ChannelDescriptor {
    #[serde(default, deserialize_with = "loose_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    language: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    lang: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    site_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    channel_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    xmltv_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    device: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    lineup_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    headend_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    country: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    postal: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    prgsvcid: Option<String>,
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseValue> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_text()))
}

/// Load channel descriptors from a JSON or XML file
pub fn load_channel_sources(path: &Path) -> AppResult<Vec<ChannelSource>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::configuration(format!("Cannot read channel file '{}': {e}", path.display()))
    })?;
    parse_channel_sources(&contents).map_err(|e| match e {
        AppError::Configuration { message } => {
            AppError::configuration(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Parse channel descriptors, detecting the format from the content
pub fn parse_channel_sources(contents: &str) -> AppResult<Vec<ChannelSource>> {
    let trimmed = contents.trim_start_matches('\u{feff}').trim_start();
    let descriptors = if trimmed.starts_with('<') {
        parse_xml_descriptors(trimmed)?
    } else {
        parse_json_descriptors(trimmed)?
    };

    let total = descriptors.len();
    let sources: Vec<ChannelSource> = descriptors
        .into_iter()
        .enumerate()
        .filter_map(|(idx, descriptor)| {
            let source = descriptor.into_source();
            if source.is_none() {
                warn!("Skipping channel entry {}/{} without a site or channel id", idx + 1, total);
            }
            source
        })
        .collect();

    debug!("Loaded {} of {} channel descriptors", sources.len(), total);
    Ok(sources)
}

fn parse_json_descriptors(contents: &str) -> AppResult<Vec<ChannelDescriptor>> {
    let value: serde_json::Value = serde_json::from_str(contents)
        .map_err(|e| AppError::configuration(format!("Invalid JSON: {e}")))?;

    let serde_json::Value::Array(entries) = value else {
        return Err(AppError::configuration(
            "Channel file must contain a JSON array",
        ));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            serde_json::from_value(entry).map_err(|e| {
                AppError::configuration(format!("Invalid channel entry {}: {e}", idx + 1))
            })
        })
        .collect()
}

fn parse_xml_descriptors(contents: &str) -> AppResult<Vec<ChannelDescriptor>> {
    let root = parse_document(contents)
        .map_err(|e| AppError::configuration(format!("Invalid channel XML: {e}")))?;

    Ok(root
        .descendants()
        .filter(|e| e.name == "channel")
        .map(descriptor_from_element)
        .collect())
}

fn descriptor_from_element(element: &XmlElement) -> ChannelDescriptor {
    let attr = |key: &str| {
        element
            .attr(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let text = element.trimmed_text();

    let mut descriptor = ChannelDescriptor {
        name: (!text.is_empty()).then(|| text.to_string()),
        language: None,
        lang: attr("lang"),
        site_id: attr("site_id"),
        channel_id: None,
        id: None,
        xmltv_id: attr("xmltv_id"),
        device: None,
        lineup_id: None,
        headend_id: None,
        country: None,
        postal: None,
        prgsvcid: None,
    };

    // site_id carries the lineup as device/lineup/headend/country/postal/prgsvcid
    if let Some(site_id) = &descriptor.site_id {
        let parts: Vec<&str> = site_id.split('/').collect();
        if parts.len() >= 6 {
            let part = |i: usize| Some(parts[i].to_string()).filter(|p| !p.is_empty());
            descriptor.device = part(0);
            descriptor.lineup_id = part(1);
            descriptor.headend_id = part(2);
            descriptor.country = part(3);
            descriptor.postal = part(4);
            descriptor.prgsvcid = part(5);
        }
    }

    descriptor
}

impl ChannelDescriptor {
    fn into_source(self) -> Option<ChannelSource> {
        let xmltv_id = self.xmltv_id.filter(|id| !id.is_empty());
        let site_id = self.site_id.or(self.channel_id).or(self.id);
        let site_id = match (site_id, &xmltv_id) {
            (Some(site_id), _) => site_id,
            (None, Some(xmltv_id)) => xmltv_id.clone(),
            (None, None) => return None,
        };

        Some(ChannelSource {
            name: self.name,
            language: self.language.or(self.lang),
            site_id,
            xmltv_id,
            lineup: GridLineup {
                device: self.device,
                lineup_id: self.lineup_id,
                headend_id: self.headend_id,
                country: self.country,
                postal: self.postal,
                prgsvcid: self.prgsvcid,
            },
        })
    }
}
