//! Dashboard pipeline: one request in, one table per panel out.
//!
//! ```text
//! ActivitySource ──┬─ deliveries ──┬─ AsofMatcher ── KMeans ───────── matched
//!                  ├─ exits ───────┘
//!                  │  deliveries ──┬─ build_timeline ─ Rolling ────── timeline
//!                  ├─ counts ──────┘
//!                  │  deliveries ──── SeasonalDecomposer ──────────── decomposition
//!                  ├─ pings ───────── expand_pings ────────────────── dwell
//!                  └─ fish ────────┬─ IsolationForest ─────────────── outliers
//!                                  ├─ KMeans ──────────────────────── delivery_clusters
//!                                  └─ species_breakdown ───────────── species
//! ```
//!
//! Every panel is a separate `Result`. A failed fetch fails only the panels
//! that read from it.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::domain::{
    AnomalyDayRecord, ClusteredDelivery, ClusteredMatch, DateWindow, Decomposition,
    DwellDayRecord, FilterKind, FilterSet, ScoredDelivery, SpeciesTotal,
};
use crate::error::PipelineError;
use crate::port::{ActivitySource, QueryScope, SourceResult};

use super::aggregate::build_timeline;
use super::anomaly::{score_deliveries, IsolationForest, RollingDetector};
use super::cluster::{cluster_deliveries, cluster_matches, KMeans};
use super::decompose::SeasonalDecomposer;
use super::dwell::expand_pings;
use super::matching::AsofMatcher;
use super::normalize;
use super::species::species_breakdown;

/// Persisted date constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateDefaults {
    /// First day of the range used when no valid dates are given.
    pub default_start: NaiveDate,
    /// Last day (inclusive) of that range.
    pub default_end: NaiveDate,
    /// Earliest selectable day; earlier starts are raised to it.
    pub min_allowed: NaiveDate,
}

/// Stage parameters for one pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub dates: DateDefaults,
    pub matcher: AsofMatcher,
    pub rolling: RollingDetector,
    pub forest: IsolationForest,
    pub matched_kmeans: KMeans,
    pub delivery_kmeans: KMeans,
    pub decomposer: SeasonalDecomposer,
}

/// One dashboard request.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Raw start date parameter.
    pub start: Option<String>,
    /// Raw end date parameter (inclusive day).
    pub end: Option<String>,
    pub filters: FilterSet,
}

/// Window actually used for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    pub window: DateWindow,
    /// Set when the requested dates were invalid and the default range was
    /// used instead.
    pub fallback: Option<PipelineError>,
}

/// All panel tables for one request.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub window: ResolvedWindow,
    pub matched: Result<Vec<ClusteredMatch>, PipelineError>,
    pub timeline: Result<Vec<AnomalyDayRecord>, PipelineError>,
    pub dwell: Result<Vec<DwellDayRecord>, PipelineError>,
    pub outliers: Result<Vec<ScoredDelivery>, PipelineError>,
    pub delivery_clusters: Result<Vec<ClusteredDelivery>, PipelineError>,
    pub species: Result<Vec<SpeciesTotal>, PipelineError>,
    pub decomposition: Result<Decomposition, PipelineError>,
}

impl Dashboard {
    /// Number of panels that failed.
    #[must_use]
    pub fn failed_panels(&self) -> usize {
        [
            self.matched.is_err(),
            self.timeline.is_err(),
            self.dwell.is_err(),
            self.outliers.is_err(),
            self.delivery_clusters.is_err(),
            self.species.is_err(),
            self.decomposition.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Analysis service over an injected activity source.
pub struct Pipeline {
    source: Arc<dyn ActivitySource>,
    settings: AnalysisSettings,
}

impl Pipeline {
    #[must_use]
    pub fn new(source: Arc<dyn ActivitySource>, settings: AnalysisSettings) -> Self {
        Self { source, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Normalize the requested dates.
    ///
    /// Invalid dates fall back to the configured default range. The start is
    /// then raised to the minimum allowed day.
    #[must_use]
    pub fn resolve_window(&self, start: Option<&str>, end: Option<&str>) -> ResolvedWindow {
        let dates = self.settings.dates;
        let (window, fallback) = match DateWindow::from_params(start, end) {
            Ok(window) => (window, None),
            Err(err) => {
                warn!(error = %err, "Invalid date parameter, using default range");
                let window = DateWindow::inclusive(Some(dates.default_start), Some(dates.default_end))
                    .unwrap_or_default();
                (window, Some(err))
            }
        };
        ResolvedWindow {
            window: window.clamp_start(dates.min_allowed),
            fallback,
        }
    }

    /// Run every panel for one request.
    pub async fn run(&self, request: &AnalysisRequest) -> Dashboard {
        let resolved = self.resolve_window(request.start.as_deref(), request.end.as_deref());
        let scope = QueryScope::new(resolved.window, request.filters.clone());
        info!(
            source = self.source.name(),
            window = %scope.window,
            filters = scope.filters.active().count(),
            "Running analysis"
        );

        let (deliveries, exits, counts, pings, fish) = tokio::join!(
            self.source.fetch_delivery_qty(&scope),
            self.source.fetch_exit_events(&scope),
            self.source.fetch_vessel_counts(&scope),
            self.source.fetch_transport_pings(&scope),
            self.source.fetch_fish_deliveries(&scope),
        );

        let deliveries = deliveries.map(|rows| normalize::deliveries(&rows));
        let exits = exits.map(|rows| normalize::exit_events(&rows));
        let counts = counts.map(|rows| normalize::vessel_counts(&rows));
        let pings = pings.map(|rows| normalize::transport_pings(&rows));
        let fish = fish.map(|rows| normalize::fish_deliveries(&rows));

        let settings = &self.settings;
        let matched = both(&deliveries, &exits).and_then(|(deliveries, exits)| {
            let matched = settings.matcher.match_exits(deliveries, exits);
            cluster_matches(&matched, &settings.matched_kmeans)
                .map_err(|e| PipelineError::stage("cluster_matches", &e))
        });
        let timeline = both(&deliveries, &counts).map(|(deliveries, counts)| {
            settings.rolling.detect(&build_timeline(deliveries, counts))
        });
        let decomposition = deliveries
            .clone()
            .and_then(|deliveries| settings.decomposer.decompose(&deliveries));
        let dwell = pings.map(|pings| expand_pings(&pings));
        let outliers = fish.clone().and_then(|fish| {
            score_deliveries(&fish, &settings.forest)
                .map_err(|e| PipelineError::stage("score_deliveries", &e))
        });
        let delivery_clusters = fish.clone().and_then(|fish| {
            cluster_deliveries(&fish, &settings.delivery_kmeans)
                .map_err(|e| PipelineError::stage("cluster_deliveries", &e))
        });
        let species = fish.map(|fish| species_breakdown(&fish));

        let dashboard = Dashboard {
            window: resolved,
            matched,
            timeline,
            dwell,
            outliers,
            delivery_clusters,
            species,
            decomposition,
        };
        log_panels(&dashboard);
        dashboard
    }

    /// Dropdown values for one filter dimension.
    ///
    /// # Errors
    ///
    /// Propagates the source failure.
    pub async fn options(&self, kind: FilterKind, filters: &FilterSet) -> SourceResult<Vec<String>> {
        self.source.list_options(kind, &filters.without(kind)).await
    }
}

fn both<'a, A, B>(
    a: &'a Result<Vec<A>, PipelineError>,
    b: &'a Result<Vec<B>, PipelineError>,
) -> Result<(&'a [A], &'a [B]), PipelineError> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), _) | (_, Err(e)) => Err(e.clone()),
    }
}

fn log_panels(dashboard: &Dashboard) {
    let panels: [(&str, Option<&PipelineError>); 7] = [
        ("matched", dashboard.matched.as_ref().err()),
        ("timeline", dashboard.timeline.as_ref().err()),
        ("dwell", dashboard.dwell.as_ref().err()),
        ("outliers", dashboard.outliers.as_ref().err()),
        ("delivery_clusters", dashboard.delivery_clusters.as_ref().err()),
        ("species", dashboard.species.as_ref().err()),
        ("decomposition", dashboard.decomposition.as_ref().err()),
    ];
    for (panel, err) in panels {
        if let Some(err) = err {
            match err {
                PipelineError::InsufficientData { .. } => warn!(panel, error = %err, "Panel unavailable"),
                _ => error!(panel, error = %err, "Panel failed"),
            }
        }
    }
    info!(failed = dashboard.failed_panels(), "Analysis complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::source::{FailingSource, InMemorySource};
    use crate::testkit::settings::default_settings;
    use serde_json::json;

    fn pipeline(source: impl ActivitySource + 'static) -> Pipeline {
        Pipeline::new(Arc::new(source), default_settings())
    }

    #[test]
    fn invalid_dates_fall_back_to_default_range() {
        let pipeline = pipeline(InMemorySource::default());
        let resolved = pipeline.resolve_window(Some("05/01/2035"), None);
        assert!(matches!(
            resolved.fallback,
            Some(PipelineError::InvalidDateFormat { .. })
        ));
        assert_eq!(resolved.window.start_param().as_deref(), Some("2035-01-01"));
        assert_eq!(resolved.window.end_param().as_deref(), Some("2035-03-01"));
    }

    #[test]
    fn early_start_is_clamped() {
        let pipeline = pipeline(InMemorySource::default());
        let resolved = pipeline.resolve_window(Some("2030-06-01"), Some("2035-01-10"));
        assert!(resolved.fallback.is_none());
        assert_eq!(resolved.window.start_param().as_deref(), Some("2035-01-01"));
        assert_eq!(resolved.window.end_param().as_deref(), Some("2035-01-11"));
    }

    #[tokio::test]
    async fn failing_source_fails_every_panel_independently() {
        let dashboard = pipeline(FailingSource::new("boom"))
            .run(&AnalysisRequest::default())
            .await;
        assert_eq!(dashboard.failed_panels(), 7);
        assert!(matches!(
            dashboard.matched,
            Err(PipelineError::UpstreamQueryFailure { .. })
        ));
    }

    #[tokio::test]
    async fn one_failed_fetch_only_affects_its_panels() {
        let source = InMemorySource::default()
            .with_pings(vec![json!({
                "source_location": "City of Haacklee",
                "vessel_id": "v-1",
                "start_time": "2035-01-10T22:00:00",
                "dwell": 7200
            })])
            .failing_on("fetch_fish_deliveries");
        let dashboard = pipeline(source).run(&AnalysisRequest::default()).await;
        assert!(dashboard.outliers.is_err());
        assert!(dashboard.species.is_err());
        assert!(dashboard.delivery_clusters.is_err());
        assert_eq!(dashboard.dwell.as_ref().map(Vec::len), Ok(2));
        assert!(dashboard.timeline.is_ok());
    }

    #[tokio::test]
    async fn short_history_reports_insufficient_data() {
        let source = InMemorySource::default().with_deliveries(vec![
            json!({"date": "2035-01-02", "qty_tons": 4.0}),
            json!({"date": "2035-01-03", "qty_tons": 6.0}),
        ]);
        let dashboard = pipeline(source).run(&AnalysisRequest::default()).await;
        assert!(matches!(
            dashboard.decomposition,
            Err(PipelineError::InsufficientData { available: 2, .. })
        ));
    }
}
