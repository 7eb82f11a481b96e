//! Sequential guide orchestrator
//!
//! Walks the configured channels in order, fetches their listings through the
//! provider, and runs every response through extraction and normalization.
//! Upstream failures are logged and recovered per channel (or per day); they
//! never abort the run.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SourceInfo;
use crate::errors::SourceResult;
use crate::ingestor::{RawListingDocument, RawProgramFields, extract};
use crate::models::{Channel, ChannelSource, Program};
use crate::normalizer::Normalizer;
use crate::sources::{EmptyTitlePolicy, FetchSchedule, ListingProvider};
use crate::utils::time::local_today;
use crate::xmltv::XmltvDocument;

/// Counters collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideStatistics {
    pub channels: usize,
    pub fetches: usize,
    pub failed_fetches: usize,
    /// Channels for which not a single fetch succeeded
    pub failed_channels: usize,
    pub programs: usize,
    /// Candidates removed by the empty-title admission filter
    pub dropped_untitled: usize,
}

/// Everything one run produced, in channel order
#[derive(Debug, Clone, Default)]
pub struct GuideOutput {
    pub channels: Vec<Channel>,
    pub programs: Vec<Program>,
    pub statistics: GuideStatistics,
}

impl GuideOutput {
    pub fn into_document(self, source_info: SourceInfo) -> XmltvDocument {
        XmltvDocument::build(source_info, self.channels, self.programs)
    }
}

pub struct GuideOrchestrator {
    provider: Arc<dyn ListingProvider>,
    normalizer: Normalizer,
    window: Vec<NaiveDate>,
}

impl GuideOrchestrator {
    pub fn new(provider: Arc<dyn ListingProvider>, normalizer: Normalizer, window: Vec<NaiveDate>) -> Self {
        Self {
            provider,
            normalizer,
            window,
        }
    }

    pub fn provider(&self) -> &dyn ListingProvider {
        self.provider.as_ref()
    }

    /// Fetch, extract and normalize listings for every source, in order
    pub async fn run(&self, sources: &[ChannelSource]) -> GuideOutput {
        let started = Instant::now();
        let mut output = GuideOutput::default();
        let total = sources.len();

        info!(
            "Processing {} channel(s) from {} over {} day(s)",
            total,
            self.provider.kind(),
            self.window.len()
        );

        for (idx, source) in sources.iter().enumerate() {
            info!(
                "[{}/{}] Processing channel: {} ({})",
                idx + 1,
                total,
                source.label(),
                source.xmltv_id()
            );

            let (channel, programs) = self.process_channel(source, &mut output.statistics).await;
            info!("  Found {} program(s) for {}", programs.len(), channel.id);

            output.statistics.channels += 1;
            output.statistics.programs += programs.len();
            output.channels.push(channel);
            output.programs.extend(programs);
        }

        let stats = &output.statistics;
        info!(
            "Guide complete: channels={} programs={} fetches={} failed_fetches={} failed_channels={} dropped_untitled={} duration={:?}",
            stats.channels,
            stats.programs,
            stats.fetches,
            stats.failed_fetches,
            stats.failed_channels,
            stats.dropped_untitled,
            started.elapsed()
        );
        output
    }

    async fn process_channel(
        &self,
        source: &ChannelSource,
        stats: &mut GuideStatistics,
    ) -> (Channel, Vec<Program>) {
        let mut feed_name = None;
        let mut candidates = Vec::new();
        let mut succeeded = 0usize;

        let requests: Vec<(NaiveDate, Vec<NaiveDate>)> = match self.provider.fetch_schedule() {
            FetchSchedule::PerDay => self.window.iter().map(|d| (*d, vec![*d])).collect(),
            FetchSchedule::Once => {
                let first = self.window.first().copied().unwrap_or_else(local_today);
                vec![(first, self.window.clone())]
            }
        };

        for (date, dates) in requests {
            stats.fetches += 1;
            match self.fetch_document(source, date).await {
                Ok(document) => {
                    succeeded += 1;
                    if feed_name.is_none() {
                        feed_name = document.channel_display_name();
                    }
                    candidates.extend(extract(&document, &dates));
                }
                Err(e) => {
                    stats.failed_fetches += 1;
                    warn!("Failed to fetch listings for {} on {}: {}", source.label(), date, e);
                }
            }
        }

        if succeeded == 0 {
            stats.failed_channels += 1;
        }

        let channel = self.channel_for(source, feed_name);

        if self.provider.empty_title_policy() == EmptyTitlePolicy::Drop {
            let before = candidates.len();
            candidates.retain(RawProgramFields::has_title);
            let dropped = before - candidates.len();
            if dropped > 0 {
                debug!("Dropped {} untitled candidates for {}", dropped, channel.id);
                stats.dropped_untitled += dropped;
            }
        }

        let programs = candidates
            .iter()
            .map(|raw| self.normalizer.normalize(raw, &channel))
            .collect();

        (channel, programs)
    }

    async fn fetch_document(&self, source: &ChannelSource, date: NaiveDate) -> SourceResult<RawListingDocument> {
        let body = self.provider.fetch(source, date).await?;
        debug!("Received {} bytes for {} on {}", body.len(), source.label(), date);
        RawListingDocument::parse(&body)
    }

    /// Canonical channel record; the display name prefers the feed's own
    fn channel_for(&self, source: &ChannelSource, feed_name: Option<String>) -> Channel {
        let id = source.xmltv_id().to_string();
        let display_name = feed_name
            .or_else(|| source.name.clone().filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| format!("Channel {id}"));
        let language = source
            .language
            .clone()
            .filter(|l| !l.is_empty())
            .or_else(|| self.provider.default_language().map(str::to_string));

        Channel {
            id,
            display_name,
            language,
        }
    }
}
