//! XMLTV document builder
//!
//! Output is written by hand with `quick_xml::escape::escape` so the layout
//! stays fixed: declaration, optional DOCTYPE, two-space indentation, all
//! channels before any programme, input order preserved.

use quick_xml::escape::escape;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::SourceInfo;
use crate::errors::AppResult;
use crate::models::{Channel, Program};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const XMLTV_DOCTYPE: &str = r#"<!DOCTYPE tv SYSTEM "xmltv.dtd">"#;

/// A complete guide ready to be serialized
#[derive(Debug, Clone, PartialEq)]
pub struct XmltvDocument {
    pub source_info: SourceInfo,
    pub channels: Vec<Channel>,
    pub programs: Vec<Program>,
    pub doctype: bool,
}

impl XmltvDocument {
    /// Assemble a document; channels without an id are left out
    pub fn build(source_info: SourceInfo, channels: Vec<Channel>, programs: Vec<Program>) -> Self {
        let total = channels.len();
        let channels: Vec<Channel> = channels
            .into_iter()
            .filter(|c| !c.id.trim().is_empty())
            .collect();
        if channels.len() < total {
            warn!("Skipped {} channels with an empty id", total - channels.len());
        }

        Self {
            source_info,
            channels,
            programs,
            doctype: true,
        }
    }

    pub fn with_doctype(mut self, doctype: bool) -> Self {
        self.doctype = doctype;
        self
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(256 + self.programs.len() * 320);

        out.push_str(XML_DECLARATION);
        out.push('\n');
        if self.doctype {
            out.push_str(XMLTV_DOCTYPE);
            out.push('\n');
        }

        out.push_str(&format!(
            "<tv source-info-name=\"{}\" source-info-url=\"{}\" generator-info-name=\"{}\">\n",
            escape(&self.source_info.name),
            escape(&self.source_info.url),
            escape(&self.source_info.generator)
        ));

        for channel in &self.channels {
            write_channel(&mut out, channel);
        }
        for program in &self.programs {
            write_programme(&mut out, program);
        }

        out.push_str("</tv>\n");
        out
    }

    /// Serialize to `path`, creating parent directories as needed
    pub async fn write_to_path(&self, path: &Path) -> AppResult<usize> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = self.to_xml_string();
        tokio::fs::write(path, content.as_bytes()).await?;

        info!(
            "Wrote XMLTV guide: path={} channels={} programs={} bytes={}",
            path.display(),
            self.channels.len(),
            self.programs.len(),
            content.len()
        );
        Ok(content.len())
    }
}

fn write_channel(out: &mut String, channel: &Channel) {
    out.push_str(&format!("  <channel id=\"{}\">\n", escape(&channel.id)));
    out.push_str(&format!(
        "    <display-name>{}</display-name>\n",
        escape(&channel.display_name)
    ));
    out.push_str("  </channel>\n");
}

fn write_programme(out: &mut String, program: &Program) {
    out.push_str(&format!(
        "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">\n",
        escape(&program.start.to_xmltv()),
        escape(&program.stop.to_xmltv()),
        escape(&program.channel_id)
    ));

    let lang = program
        .language
        .as_deref()
        .filter(|l| !l.is_empty())
        .map(|l| format!(" lang=\"{}\"", escape(l)))
        .unwrap_or_default();

    out.push_str(&format!("    <title{lang}>{}</title>\n", escape(&program.title)));
    if let Some(sub_title) = &program.episode_title {
        out.push_str(&format!("    <sub-title{lang}>{}</sub-title>\n", escape(sub_title)));
    }
    if let Some(desc) = &program.description {
        out.push_str(&format!("    <desc{lang}>{}</desc>\n", escape(desc)));
    }
    if let Some(episode) = &program.episode {
        out.push_str(&format!(
            "    <episode-num system=\"xmltv_ns\">{}</episode-num>\n",
            episode.xmltv_ns()
        ));
        out.push_str(&format!(
            "    <episode-num system=\"onscreen\">{}</episode-num>\n",
            episode.onscreen()
        ));
    }
    if let Some(rating) = &program.rating {
        out.push_str("    <rating>\n");
        out.push_str(&format!("      <value>{}</value>\n", escape(rating)));
        out.push_str("    </rating>\n");
    }

    out.push_str("  </programme>\n");
    debug!("Serialized programme '{}' on {}", program.title, program.channel_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EpisodeNumber, ListingTime};
    use crate::utils::xml_tree::parse_document;

    fn source_info() -> SourceInfo {
        SourceInfo {
            name: "Test Listings".to_string(),
            url: "https://example.com".to_string(),
            generator: "Test Generator".to_string(),
        }
    }

    fn channel(id: &str, name: &str) -> Channel {
        Channel {
            id: id.to_string(),
            display_name: name.to_string(),
            language: Some("en".to_string()),
        }
    }

    fn program(channel_id: &str, title: &str) -> Program {
        Program {
            start: ListingTime::Verbatim("20240101120000 +0000".to_string()),
            stop: ListingTime::Verbatim("20240101130000 +0000".to_string()),
            channel_id: channel_id.to_string(),
            title: title.to_string(),
            episode_title: None,
            description: None,
            episode: None,
            rating: None,
            language: Some("en".to_string()),
        }
    }

    #[test]
    fn test_document_layout() {
        let mut full = program("5", "News");
        full.episode_title = Some("Evening".to_string());
        full.description = Some("Headlines & weather".to_string());
        full.episode = Some(EpisodeNumber { season: 2, episode: 5 });
        full.rating = Some("TV-PG".to_string());

        let xml = XmltvDocument::build(source_info(), vec![channel("5", "Test")], vec![full])
            .to_xml_string();

        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE tv SYSTEM "xmltv.dtd">
<tv source-info-name="Test Listings" source-info-url="https://example.com" generator-info-name="Test Generator">
  <channel id="5">
    <display-name>Test</display-name>
  </channel>
  <programme start="20240101120000 +0000" stop="20240101130000 +0000" channel="5">
    <title lang="en">News</title>
    <sub-title lang="en">Evening</sub-title>
    <desc lang="en">Headlines &amp; weather</desc>
    <episode-num system="xmltv_ns">2.5.0</episode-num>
    <episode-num system="onscreen">S2E5</episode-num>
    <rating>
      <value>TV-PG</value>
    </rating>
  </programme>
</tv>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_doctype_can_be_disabled() {
        let xml = XmltvDocument::build(source_info(), vec![], vec![])
            .with_doctype(false)
            .to_xml_string();
        assert!(!xml.contains("DOCTYPE"));
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(parse_document(&xml).is_ok());
    }

    #[test]
    fn test_language_attribute_omitted_when_empty() {
        let mut p = program("5", "News");
        p.language = Some(String::new());
        p.description = Some("Desc".to_string());
        let xml = XmltvDocument::build(source_info(), vec![], vec![p]).to_xml_string();
        assert!(xml.contains("    <title>News</title>\n"));
        assert!(xml.contains("    <desc>Desc</desc>\n"));
    }

    #[test]
    fn test_channels_without_id_are_skipped() {
        let doc = XmltvDocument::build(
            source_info(),
            vec![channel("", "Ghost"), channel("a", "A")],
            vec![],
        );
        assert_eq!(doc.channels.len(), 1);
        assert_eq!(doc.channels[0].id, "a");
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let channels = vec![channel("b", "B"), channel("a", "A <1>"), channel("c", "C")];
        let programs = vec![
            program("c", "Third & last"),
            program("a", "First"),
            program("b", "\"Quoted\""),
            program("a", "Again"),
        ];

        let xml = XmltvDocument::build(source_info(), channels.clone(), programs.clone())
            .to_xml_string();
        let root = parse_document(&xml).unwrap();

        assert_eq!(root.attr("source-info-name"), Some("Test Listings"));
        let parsed_channels: Vec<(&str, String)> = root
            .children
            .iter()
            .filter(|e| e.name == "channel")
            .map(|e| (e.attr("id").unwrap(), e.child_text("display-name").unwrap()))
            .collect();
        assert_eq!(
            parsed_channels,
            channels
                .iter()
                .map(|c| (c.id.as_str(), c.display_name.clone()))
                .collect::<Vec<_>>()
        );

        let parsed_programs: Vec<_> = root
            .children
            .iter()
            .filter(|e| e.name == "programme")
            .collect();
        assert_eq!(parsed_programs.len(), programs.len());
        for (parsed, expected) in parsed_programs.iter().zip(&programs) {
            assert_eq!(parsed.attr("channel"), Some(expected.channel_id.as_str()));
            assert_eq!(parsed.attr("start"), Some("20240101120000 +0000"));
            assert_eq!(parsed.attr("stop"), Some("20240101130000 +0000"));
            assert_eq!(parsed.child_text("title").as_deref(), Some(expected.title.as_str()));
        }

        // channels come first
        let first_programme = root.children.iter().position(|e| e.name == "programme").unwrap();
        assert!(root.children[..first_programme].iter().all(|e| e.name == "channel"));
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide").join("out.xml");

        let doc = XmltvDocument::build(source_info(), vec![channel("5", "Test")], vec![]);
        let written = doc.write_to_path(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.len(), written);
        assert!(content.contains("<channel id=\"5\">"));
    }
}
