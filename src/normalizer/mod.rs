//! Program normalizer
//!
//! Turns the raw fields of any listing shape into a canonical [`Program`].
//! Normalization is total: missing or unusable fields are replaced by
//! configured defaults, never reported as errors.

use chrono::Duration;
use tracing::trace;

use crate::config::NormalizeConfig;
use crate::ingestor::{GridFields, MarkupFields, RawProgramFields};
use crate::models::{Channel, EpisodeNumber, ListingTime, LooseValue, Program};
use crate::utils::time::parse_xmltv_time;

#[derive(Debug, Clone)]
pub struct Normalizer {
    placeholder_title: String,
    default_duration: Duration,
    sentinel_start: ListingTime,
    sentinel_stop: ListingTime,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            placeholder_title: config.placeholder_title.clone(),
            default_duration: Duration::from_std(config.default_duration)
                .unwrap_or_else(|_| Duration::minutes(30)),
            sentinel_start: sentinel(&config.sentinel_start),
            sentinel_stop: sentinel(&config.sentinel_stop),
        }
    }

    /// Build the canonical programme for `raw` on `channel`
    pub fn normalize(&self, raw: &RawProgramFields, channel: &Channel) -> Program {
        let program = match raw {
            RawProgramFields::Programme(fields)
            | RawProgramFields::FeedItem(fields)
            | RawProgramFields::Generic(fields) => self.from_markup(fields, channel),
            RawProgramFields::Grid(fields) => self.from_grid(fields, channel),
        };
        trace!(
            "Normalized {} candidate '{}' at {}",
            raw.shape_name(),
            program.title,
            program.start
        );
        program
    }

    fn from_markup(&self, fields: &MarkupFields, channel: &Channel) -> Program {
        let start = fields.start.as_deref().map(ListingTime::from_wire);
        let stop = fields.stop.as_deref().map(ListingTime::from_wire);
        let (start, stop) = self.resolve_times(start, stop);

        Program {
            start,
            stop,
            channel_id: channel.id.clone(),
            title: self.title_or_placeholder(fields.title.as_deref()),
            episode_title: None,
            description: non_empty(fields.description.as_deref()),
            episode: None,
            rating: None,
            language: channel.language.clone(),
        }
    }

    fn from_grid(&self, fields: &GridFields, channel: &Channel) -> Program {
        let start = fields.start.and_then(ListingTime::from_epoch);
        let stop = fields.stop.and_then(ListingTime::from_epoch);
        let (start, stop) = self.resolve_times(start, stop);

        Program {
            start,
            stop,
            channel_id: channel.id.clone(),
            title: self.title_or_placeholder(fields.title.as_deref()),
            episode_title: non_empty(fields.episode_title.as_deref()),
            description: non_empty(fields.description.as_deref()),
            episode: episode_number(fields.season.as_ref(), fields.episode.as_ref()),
            rating: non_empty(fields.rating.as_deref()),
            language: channel.language.clone(),
        }
    }

    fn resolve_times(
        &self,
        start: Option<ListingTime>,
        stop: Option<ListingTime>,
    ) -> (ListingTime, ListingTime) {
        let stop = match (&start, stop) {
            (_, Some(stop)) => stop,
            (Some(start), None) => start
                .instant()
                .and_then(|s| s.checked_add_signed(self.default_duration))
                .map(ListingTime::Instant)
                .unwrap_or_else(|| self.sentinel_stop.clone()),
            (None, None) => self.sentinel_stop.clone(),
        };
        let start = start.unwrap_or_else(|| self.sentinel_start.clone());

        // stop never precedes start
        match (start.instant(), stop.instant()) {
            (Some(s), Some(e)) if e < s => (start.clone(), start),
            _ => (start, stop),
        }
    }

    fn title_or_placeholder(&self, title: Option<&str>) -> String {
        non_empty(title).unwrap_or_else(|| self.placeholder_title.clone())
    }
}

/// Both values must be present and non-zero
fn episode_number(season: Option<&LooseValue>, episode: Option<&LooseValue>) -> Option<EpisodeNumber> {
    let season = season?.as_u32().filter(|s| *s != 0)?;
    let episode = episode?.as_u32().filter(|e| *e != 0)?;
    Some(EpisodeNumber { season, episode })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Offset-less sentinels are read as UTC
fn sentinel(value: &str) -> ListingTime {
    parse_xmltv_time(value)
        .map(ListingTime::Instant)
        .unwrap_or_else(|| ListingTime::Verbatim(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn normalizer() -> Normalizer {
        Normalizer::new(&NormalizeConfig::default())
    }

    fn channel() -> Channel {
        Channel {
            id: "5".to_string(),
            display_name: "Test".to_string(),
            language: Some("en".to_string()),
        }
    }

    fn markup(start: Option<&str>, stop: Option<&str>, title: Option<&str>) -> MarkupFields {
        MarkupFields {
            start: start.map(str::to_string),
            stop: stop.map(str::to_string),
            title: title.map(str::to_string),
            description: None,
        }
    }

    #[test]
    fn test_xmltv_timestamps_pass_through_unchanged() {
        let raw = RawProgramFields::Programme(markup(
            Some("20240101120000 +0100"),
            Some("20240101130000 +0100"),
            Some("Film"),
        ));
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.start.to_xmltv(), "20240101120000 +0100");
        assert_eq!(program.stop.to_xmltv(), "20240101130000 +0100");
        assert_eq!(program.channel_id, "5");
        assert_eq!(program.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_fields() {
        let n = normalizer();
        let first = n.normalize(
            &RawProgramFields::Programme(markup(Some("20240101120000"), Some("20240101130000"), Some("A"))),
            &channel(),
        );
        let again = n.normalize(
            &RawProgramFields::Programme(markup(
                Some(&first.start.to_xmltv()),
                Some(&first.stop.to_xmltv()),
                Some(&first.title),
            )),
            &channel(),
        );
        assert_eq!(first, again);
    }

    #[test]
    fn test_missing_times_use_sentinels() {
        let raw = RawProgramFields::FeedItem(markup(None, None, Some("Show")));
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.start.to_xmltv(), "20000101000000 +0000");
        assert_eq!(program.stop.to_xmltv(), "20000101010000 +0000");
    }

    #[test]
    fn test_configured_sentinels_are_rendered_in_utc() {
        let config = NormalizeConfig {
            sentinel_start: "20000101020000 +0200".to_string(),
            sentinel_stop: "20000101030000 +0200".to_string(),
            ..NormalizeConfig::default()
        };
        let raw = RawProgramFields::Generic(markup(None, None, Some("Show")));
        let program = Normalizer::new(&config).normalize(&raw, &channel());
        assert_eq!(program.start.to_xmltv(), "20000101000000 +0000");
        assert_eq!(program.stop.to_xmltv(), "20000101010000 +0000");
    }

    #[test]
    fn test_missing_stop_defaults_to_start_plus_duration() {
        let raw = RawProgramFields::Programme(markup(Some("20240101120000 +0000"), None, Some("A")));
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.start.to_xmltv(), "20240101120000 +0000");
        assert_eq!(program.stop.to_xmltv(), "20240101123000 +0000");
    }

    #[test]
    fn test_pub_date_is_converted_to_utc() {
        let raw = RawProgramFields::FeedItem(markup(
            Some("Mon, 01 Jan 2024 10:20:00 +0100"),
            None,
            Some("Show"),
        ));
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.start.to_xmltv(), "20240101092000 +0000");
        assert_eq!(program.stop.to_xmltv(), "20240101095000 +0000");
    }

    #[test]
    fn test_unparseable_start_keeps_sentinel_stop() {
        let raw = RawProgramFields::Generic(markup(Some("soon"), None, Some("Show")));
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.start.to_xmltv(), "soon");
        assert_eq!(program.stop.to_xmltv(), "20000101010000 +0000");
    }

    #[test]
    fn test_stop_before_start_is_clamped() {
        let raw = RawProgramFields::Grid(GridFields {
            start: Some(1704104400),
            stop: Some(1704100800),
            title: Some("Backwards".to_string()),
            ..Default::default()
        });
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.start, program.stop);
    }

    #[test]
    fn test_grid_epochs_render_in_utc() {
        let raw = RawProgramFields::Grid(GridFields {
            start: Some(1704100800),
            stop: Some(1704104400),
            title: Some("News".to_string()),
            episode_title: Some(" ".to_string()),
            description: Some("Headlines".to_string()),
            rating: Some("TV-PG".to_string()),
            ..Default::default()
        });
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.start.to_xmltv(), "20240101092000 +0000");
        assert_eq!(program.stop.to_xmltv(), "20240101102000 +0000");
        assert_eq!(program.episode_title, None);
        assert_eq!(program.description.as_deref(), Some("Headlines"));
        assert_eq!(program.rating.as_deref(), Some("TV-PG"));
    }

    #[test]
    fn test_empty_title_becomes_placeholder() {
        let raw = RawProgramFields::Grid(GridFields::default());
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(program.title, "Unknown");
        assert_eq!(program.start.to_xmltv(), "20000101000000 +0000");
    }

    #[rstest]
    #[case(Some(LooseValue::Integer(2)), Some(LooseValue::Integer(5)), Some((2, 5)))]
    #[case(Some(LooseValue::Text("3".into())), Some(LooseValue::Text("12".into())), Some((3, 12)))]
    #[case(Some(LooseValue::Integer(0)), Some(LooseValue::Integer(1)), None)]
    #[case(Some(LooseValue::Integer(1)), Some(LooseValue::Integer(0)), None)]
    #[case(Some(LooseValue::Integer(1)), None, None)]
    #[case(None, Some(LooseValue::Integer(4)), None)]
    #[case(Some(LooseValue::Text("special".into())), Some(LooseValue::Integer(4)), None)]
    #[case(Some(LooseValue::Integer(-1)), Some(LooseValue::Integer(4)), None)]
    fn test_episode_pairs(
        #[case] season: Option<LooseValue>,
        #[case] episode: Option<LooseValue>,
        #[case] expected: Option<(u32, u32)>,
    ) {
        let raw = RawProgramFields::Grid(GridFields {
            start: Some(0),
            title: Some("Series".to_string()),
            season,
            episode,
            ..Default::default()
        });
        let program = normalizer().normalize(&raw, &channel());
        assert_eq!(
            program.episode.map(|e| (e.season, e.episode)),
            expected
        );
    }

    #[test]
    fn test_configured_defaults_are_used() {
        let config = NormalizeConfig {
            placeholder_title: "TBA".to_string(),
            default_duration: std::time::Duration::from_secs(3600),
            sentinel_start: "19700101000000".to_string(),
            sentinel_stop: "19700101010000".to_string(),
        };
        let n = Normalizer::new(&config);

        let untitled = n.normalize(&RawProgramFields::Grid(GridFields::default()), &channel());
        assert_eq!(untitled.title, "TBA");
        assert_eq!(untitled.start.to_xmltv(), "19700101000000");
        assert_eq!(untitled.stop.to_xmltv(), "19700101010000");

        let open_ended = n.normalize(
            &RawProgramFields::Grid(GridFields {
                start: Some(1704100800),
                ..Default::default()
            }),
            &channel(),
        );
        assert_eq!(open_ended.stop.to_xmltv(), "20240101102000 +0000");
    }
}
