//! XML listing shapes, tried in priority order:
//! XMLTV `programme` elements, feed `item` elements, then any element whose
//! name ends in `program` or `show`. The first shape with matches wins.

use tracing::debug;

use super::{MarkupFields, RawProgramFields};
use crate::utils::xml_tree::XmlElement;

pub fn extract(root: &XmlElement) -> Vec<RawProgramFields> {
    let programmes = programme_elements(root);
    if !programmes.is_empty() {
        return programmes;
    }

    let items = feed_items(root);
    if !items.is_empty() {
        return items;
    }

    generic_programs(root)
}

fn programme_elements(root: &XmlElement) -> Vec<RawProgramFields> {
    root.descendants()
        .filter(|e| e.name == "programme")
        .map(|programme| {
            RawProgramFields::Programme(MarkupFields {
                start: verbatim_attr(programme, &["start"]),
                stop: verbatim_attr(programme, &["stop"]),
                title: programme.child_text("title"),
                description: programme
                    .child("desc")
                    .or_else(|| programme.child("description"))
                    .map(XmlElement::trimmed_text)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}

fn feed_items(root: &XmlElement) -> Vec<RawProgramFields> {
    root.descendants()
        .filter(|e| e.name == "item")
        .map(|item| {
            RawProgramFields::FeedItem(MarkupFields {
                // pubDate is copied as written; the normalizer interprets it
                start: item.child_text("pubDate"),
                stop: None,
                title: item.child_text("title"),
                description: item.child_text("description"),
            })
        })
        .collect()
}

fn generic_programs(root: &XmlElement) -> Vec<RawProgramFields> {
    let mut programs = Vec::new();
    let mut dropped = 0usize;

    for element in root.iter() {
        let name = element.local_name();
        if !(name.ends_with("program") || name.ends_with("show")) {
            continue;
        }

        let mut fields = MarkupFields {
            start: verbatim_attr(element, &["start", "begin"]),
            stop: verbatim_attr(element, &["stop", "end"]),
            ..Default::default()
        };

        for child in &element.children {
            let child_name = child.local_name();
            let text = child.trimmed_text();
            if text.is_empty() {
                continue;
            }
            if child_name.ends_with("title") || child_name.ends_with("name") {
                fields.title = Some(text.to_string());
            } else if child_name.ends_with("desc") || child_name.ends_with("description") {
                fields.description = Some(text.to_string());
            }
        }

        if fields.title.is_some() {
            programs.push(RawProgramFields::Generic(fields));
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!("Dropped {} program-like elements without a title", dropped);
    }
    programs
}

/// The first of `keys` present on `element`, as written; an empty value counts as absent
fn verbatim_attr(element: &XmlElement, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| element.attr(key))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::xml_tree::parse_document;

    fn fields(raw: &RawProgramFields) -> &MarkupFields {
        match raw {
            RawProgramFields::Programme(f)
            | RawProgramFields::FeedItem(f)
            | RawProgramFields::Generic(f) => f,
            RawProgramFields::Grid(_) => panic!("unexpected grid fields"),
        }
    }

    #[test]
    fn test_programme_shape() {
        let root = parse_document(
            r#"<tv>
              <programme start="20240101120000 +0000" stop="20240101130000 +0000" channel="a">
                <title>  Midday News </title>
                <desc>Headlines</desc>
              </programme>
              <programme start="20240101130000 +0000" stop="20240101140000 +0000">
                <title>Film</title>
                <description>Fallback description</description>
              </programme>
            </tv>"#,
        )
        .unwrap();

        let programs = extract(&root);
        assert_eq!(programs.len(), 2);
        assert!(matches!(programs[0], RawProgramFields::Programme(_)));

        let first = fields(&programs[0]);
        assert_eq!(first.start.as_deref(), Some("20240101120000 +0000"));
        assert_eq!(first.stop.as_deref(), Some("20240101130000 +0000"));
        assert_eq!(first.title.as_deref(), Some("Midday News"));
        assert_eq!(first.description.as_deref(), Some("Headlines"));

        let second = fields(&programs[1]);
        assert_eq!(second.description.as_deref(), Some("Fallback description"));
    }

    #[test]
    fn test_programme_shape_keeps_untitled_candidates() {
        let root = parse_document(r#"<tv><programme start="20240101120000"/></tv>"#).unwrap();
        let programs = extract(&root);
        assert_eq!(programs.len(), 1);
        assert_eq!(fields(&programs[0]).title, None);
        assert_eq!(fields(&programs[0]).stop, None);
    }

    #[test]
    fn test_programme_times_are_not_trimmed() {
        let root = parse_document(
            r#"<tv><programme start=" 20240101060000 " stop=""><title>Padded</title></programme></tv>"#,
        )
        .unwrap();
        let programs = extract(&root);
        assert_eq!(fields(&programs[0]).start.as_deref(), Some(" 20240101060000 "));
        assert_eq!(fields(&programs[0]).stop, None);
    }

    #[test]
    fn test_feed_item_shape() {
        let root = parse_document(
            r#"<rss version="2.0"><channel><title>Fuel</title>
                <item><title>Show A</title><description>About A</description>
                      <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate></item>
                <item><title>Show B</title></item>
                <item><title>Show C</title></item>
            </channel></rss>"#,
        )
        .unwrap();

        let programs = extract(&root);
        assert_eq!(programs.len(), 3);
        assert!(programs.iter().all(|p| matches!(p, RawProgramFields::FeedItem(_))));

        let a = fields(&programs[0]);
        assert_eq!(a.title.as_deref(), Some("Show A"));
        assert_eq!(a.description.as_deref(), Some("About A"));
        assert_eq!(a.start.as_deref(), Some("Mon, 01 Jan 2024 10:00:00 GMT"));
        assert_eq!(a.stop, None);
        assert_eq!(fields(&programs[1]).start, None);
    }

    #[test]
    fn test_generic_shape() {
        let root = parse_document(
            r#"<schedule xmlns:m="urn:media">
                <m:show begin="20240101060000" end="20240101070000">
                  <m:title>Breakfast</m:title>
                  <m:longdesc>Morning magazine</m:longdesc>
                </m:show>
                <tvprogram start="20240101070000" stop="20240101080000" begin="ignored">
                  <programname>Cartoons</programname>
                  <description>For kids</description>
                </tvprogram>
            </schedule>"#,
        )
        .unwrap();

        let programs = extract(&root);
        assert_eq!(programs.len(), 2);

        let breakfast = fields(&programs[0]);
        assert_eq!(breakfast.start.as_deref(), Some("20240101060000"));
        assert_eq!(breakfast.stop.as_deref(), Some("20240101070000"));
        assert_eq!(breakfast.title.as_deref(), Some("Breakfast"));
        assert_eq!(breakfast.description.as_deref(), Some("Morning magazine"));

        let cartoons = fields(&programs[1]);
        assert_eq!(cartoons.start.as_deref(), Some("20240101070000"));
        assert_eq!(cartoons.title.as_deref(), Some("Cartoons"));
        assert_eq!(cartoons.description.as_deref(), Some("For kids"));
    }

    #[test]
    fn test_generic_first_present_attribute_wins() {
        let root = parse_document(
            r#"<lineup><show start="" begin="20240101060000" end="20240101070000"><title>Early</title></show></lineup>"#,
        )
        .unwrap();
        let programs = extract(&root);
        assert_eq!(fields(&programs[0]).start, None);
        assert_eq!(fields(&programs[0]).stop.as_deref(), Some("20240101070000"));
    }

    #[test]
    fn test_generic_show_without_title_is_dropped() {
        let root = parse_document(
            r#"<lineup>
                <show start="20240101060000"><summary>No title here</summary></show>
                <show start="20240101070000"><title>Kept</title></show>
            </lineup>"#,
        )
        .unwrap();

        let programs = extract(&root);
        assert_eq!(programs.len(), 1);
        assert_eq!(fields(&programs[0]).title.as_deref(), Some("Kept"));
    }

    #[test]
    fn test_generic_show_with_nothing_is_dropped() {
        let root = parse_document(r#"<lineup><show start="20240101060000"/></lineup>"#).unwrap();
        assert!(extract(&root).is_empty());
    }

    #[test]
    fn test_programme_shape_takes_priority_over_items() {
        let root = parse_document(
            r#"<root>
                <item><title>Feed item</title></item>
                <programme start="20240101120000" stop="20240101130000"><title>Programme</title></programme>
                <show><title>Show</title></show>
            </root>"#,
        )
        .unwrap();

        let programs = extract(&root);
        assert_eq!(programs.len(), 1);
        assert!(matches!(programs[0], RawProgramFields::Programme(_)));
        assert_eq!(fields(&programs[0]).title.as_deref(), Some("Programme"));
    }

    #[test]
    fn test_items_take_priority_over_generic() {
        let root = parse_document(
            r#"<root><item><title>Feed item</title></item><show><title>Show</title></show></root>"#,
        )
        .unwrap();
        let programs = extract(&root);
        assert_eq!(programs.len(), 1);
        assert!(matches!(programs[0], RawProgramFields::FeedItem(_)));
    }

    #[test]
    fn test_no_shape_matches() {
        let root = parse_document("<rss><channel><title>Empty</title></channel></rss>").unwrap();
        assert!(extract(&root).is_empty());
    }
}
