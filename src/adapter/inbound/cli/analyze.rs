//! Handler for `oceanus analyze`.

use serde::Serialize;
use serde_json::{json, Value};
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{AnalyzeArgs, Panel};
use crate::adapter::inbound::cli::output;
use crate::application::pipeline::{AnalysisRequest, Dashboard};
use crate::domain::{
    AnomalyDayRecord, ClusteredDelivery, ClusteredMatch, DecompositionPoint, DwellDayRecord,
    ScoredDelivery, SpeciesTotal,
};
use crate::error::{Error, PipelineError, Result};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::pipeline::build_pipeline;

/// Execute `analyze`.
///
/// Fails only when every requested panel failed.
pub async fn execute(args: &AnalyzeArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    super::init_logging(&config);
    let pipeline = build_pipeline(&config)?;

    let request = AnalysisRequest {
        start: args.start.clone(),
        end: args.end.clone(),
        filters: args.filters.to_filter_set(),
    };
    let dashboard = pipeline.run(&request).await;
    let panels = args.panel.map_or_else(|| Panel::ALL.to_vec(), |panel| vec![panel]);

    if output::is_json() {
        output::json_output(dashboard_json(&dashboard, &panels, args.limit)?);
    } else {
        render(&dashboard, &panels, args.limit);
    }

    let failures: Vec<&PipelineError> = panels
        .iter()
        .filter_map(|panel| panel_error(&dashboard, *panel))
        .collect();
    match failures.first() {
        Some(first) if failures.len() == panels.len() => Err(Error::Pipeline((*first).clone())),
        _ => Ok(()),
    }
}

fn panel_error(dashboard: &Dashboard, panel: Panel) -> Option<&PipelineError> {
    match panel {
        Panel::Matched => dashboard.matched.as_ref().err(),
        Panel::Timeline => dashboard.timeline.as_ref().err(),
        Panel::Dwell => dashboard.dwell.as_ref().err(),
        Panel::Outliers => dashboard.outliers.as_ref().err(),
        Panel::DeliveryClusters => dashboard.delivery_clusters.as_ref().err(),
        Panel::Species => dashboard.species.as_ref().err(),
        Panel::Decomposition => dashboard.decomposition.as_ref().err(),
    }
}

fn limited<T>(rows: &[T], limit: Option<usize>) -> &[T] {
    &rows[..limit.map_or(rows.len(), |n| n.min(rows.len()))]
}

fn rows_json<T: Serialize>(
    result: &std::result::Result<Vec<T>, PipelineError>,
    limit: Option<usize>,
) -> serde_json::Result<Value> {
    Ok(match result {
        Ok(rows) => json!({
            "status": "ok",
            "total": rows.len(),
            "rows": serde_json::to_value(limited(rows, limit))?,
        }),
        Err(err) => json!({ "status": "error", "error": err.to_string() }),
    })
}

fn panel_json(dashboard: &Dashboard, panel: Panel, limit: Option<usize>) -> serde_json::Result<Value> {
    match panel {
        Panel::Matched => rows_json(&dashboard.matched, limit),
        Panel::Timeline => rows_json(&dashboard.timeline, limit),
        Panel::Dwell => rows_json(&dashboard.dwell, limit),
        Panel::Outliers => rows_json(&dashboard.outliers, limit),
        Panel::DeliveryClusters => rows_json(&dashboard.delivery_clusters, limit),
        Panel::Species => rows_json(&dashboard.species, limit),
        Panel::Decomposition => Ok(match &dashboard.decomposition {
            Ok(decomposition) => json!({
                "status": "ok",
                "period": decomposition.period,
                "total": decomposition.points.len(),
                "rows": serde_json::to_value(limited(&decomposition.points, limit))?,
            }),
            Err(err) => json!({ "status": "error", "error": err.to_string() }),
        }),
    }
}

fn dashboard_json(dashboard: &Dashboard, panels: &[Panel], limit: Option<usize>) -> Result<Value> {
    let mut panel_map = serde_json::Map::new();
    for panel in panels {
        panel_map.insert(panel.key().to_string(), panel_json(dashboard, *panel, limit)?);
    }
    let window = &dashboard.window;
    Ok(json!({
        "command": "analyze",
        "window": {
            "start": window.window.start_param(),
            "end_exclusive": window.window.end_param(),
            "fallback": window.fallback.as_ref().map(ToString::to_string),
        },
        "panels": panel_map,
    }))
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.2}")
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), fmt_f64)
}

#[derive(Tabled)]
struct MatchedRow {
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Exit")]
    exit: String,
    #[tabled(rename = "Vessel")]
    vessel: String,
    #[tabled(rename = "Hour")]
    hour: u32,
    #[tabled(rename = "Tons")]
    tons: String,
    #[tabled(rename = "Cluster")]
    cluster: usize,
}

impl From<&ClusteredMatch> for MatchedRow {
    fn from(row: &ClusteredMatch) -> Self {
        Self {
            delivery: row.record.delivery_date.to_string(),
            exit: row.record.exit_date.to_string(),
            vessel: row.record.vessel_id.to_string(),
            hour: row.record.hour,
            tons: fmt_f64(row.record.qty_tons),
            cluster: row.cluster,
        }
    }
}

#[derive(Tabled)]
struct TimelineRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Tons")]
    tons: String,
    #[tabled(rename = "Vessels")]
    vessels: String,
    #[tabled(rename = "z (tons)")]
    z_qty: String,
    #[tabled(rename = "z (vessels)")]
    z_vessels: String,
    #[tabled(rename = "Label")]
    label: String,
}

impl From<&AnomalyDayRecord> for TimelineRow {
    fn from(row: &AnomalyDayRecord) -> Self {
        Self {
            date: row.day.date.to_string(),
            tons: fmt_opt(row.day.qty_tons),
            vessels: row.day.num_vessels.map_or_else(|| "-".to_string(), |n| n.to_string()),
            z_qty: fmt_opt(row.z_score_qty),
            z_vessels: fmt_opt(row.z_score_vessels),
            label: row.anomaly.to_string(),
        }
    }
}

#[derive(Tabled)]
struct DwellRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Vessel")]
    vessel: String,
    #[tabled(rename = "Hours")]
    hours: String,
}

impl From<&DwellDayRecord> for DwellRow {
    fn from(row: &DwellDayRecord) -> Self {
        Self {
            date: row.date.to_string(),
            location: row.location_id.to_string(),
            vessel: row.vessel_id.to_string(),
            hours: fmt_f64(row.dwell_seconds / 3600.0),
        }
    }
}

fn fmt_day(day: Option<chrono::NaiveDate>) -> String {
    day.map_or_else(|| "-".to_string(), |d| d.to_string())
}

#[derive(Tabled)]
struct OutlierRow {
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Arrival")]
    arrival: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Fish")]
    fish: String,
    #[tabled(rename = "Tons")]
    tons: String,
    #[tabled(rename = "Harbor")]
    harbor: usize,
    #[tabled(rename = "Pings")]
    pings: usize,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Anomaly")]
    anomaly: u8,
}

impl From<&ScoredDelivery> for OutlierRow {
    fn from(row: &ScoredDelivery) -> Self {
        Self {
            delivery: row.record.delivery_id.to_string(),
            arrival: fmt_day(row.record.date_of_arrival),
            city: row.record.city_of_arrival.clone(),
            fish: row.record.fish_name.clone(),
            tons: fmt_f64(row.record.quantity_tons),
            harbor: row.harbor_vessels_count,
            pings: row.ping_vessels_count,
            score: format!("{:.3}", row.anomaly_score),
            anomaly: row.anomaly,
        }
    }
}

#[derive(Tabled)]
struct DeliveryClusterRow {
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Arrival")]
    arrival: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Cluster")]
    cluster: usize,
}

impl From<&ClusteredDelivery> for DeliveryClusterRow {
    fn from(row: &ClusteredDelivery) -> Self {
        Self {
            delivery: row.record.delivery_id.to_string(),
            arrival: fmt_day(row.record.date_of_arrival),
            city: row.record.city_of_arrival.clone(),
            cluster: row.cluster,
        }
    }
}

#[derive(Tabled)]
struct SpeciesRow {
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Fish")]
    fish: String,
    #[tabled(rename = "Tons")]
    tons: String,
    #[tabled(rename = "Deliveries")]
    deliveries: usize,
}

impl From<&SpeciesTotal> for SpeciesRow {
    fn from(row: &SpeciesTotal) -> Self {
        Self {
            city: row.city_of_arrival.clone(),
            fish: row.fish_name.clone(),
            tons: fmt_f64(row.quantity_tons),
            deliveries: row.deliveries,
        }
    }
}

#[derive(Tabled)]
struct DecompositionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Observed")]
    observed: String,
    #[tabled(rename = "Trend")]
    trend: String,
    #[tabled(rename = "Seasonal")]
    seasonal: String,
    #[tabled(rename = "Residual")]
    residual: String,
}

impl From<&DecompositionPoint> for DecompositionRow {
    fn from(row: &DecompositionPoint) -> Self {
        Self {
            date: row.date.to_string(),
            observed: fmt_f64(row.observed),
            trend: fmt_opt(row.trend),
            seasonal: fmt_f64(row.seasonal),
            residual: fmt_opt(row.residual),
        }
    }
}

/// Print one panel's rows as a table, or its error.
fn table<'a, T, R>(
    result: std::result::Result<&'a [T], &PipelineError>,
    limit: Option<usize>,
) where
    R: Tabled + From<&'a T>,
{
    let rows = match result {
        Ok(rows) => rows,
        Err(err) => {
            output::warning(&err.to_string());
            return;
        }
    };
    if rows.is_empty() {
        output::note("no rows");
        return;
    }
    let shown = limited(rows, limit);
    let table = Table::new(shown.iter().map(R::from)).to_string();
    output::lines(&table);
    if shown.len() < rows.len() {
        output::note(&format!("showing {} of {} rows", shown.len(), rows.len()));
    }
}

fn render(dashboard: &Dashboard, panels: &[Panel], limit: Option<usize>) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Window", &dashboard.window.window);
    if let Some(fallback) = &dashboard.window.fallback {
        output::warning(&format!("{fallback}; using the default range"));
    }

    for panel in panels {
        output::section(panel.title());
        match panel {
            Panel::Matched => {
                table::<_, MatchedRow>(dashboard.matched.as_deref(), limit);
            }
            Panel::Timeline => {
                if let Ok(rows) = &dashboard.timeline {
                    let flagged = rows.iter().filter(|r| r.anomaly.is_anomaly()).count();
                    output::field("Anomalous days", output::flagged(flagged));
                }
                table::<_, TimelineRow>(dashboard.timeline.as_deref(), limit);
            }
            Panel::Dwell => {
                table::<_, DwellRow>(dashboard.dwell.as_deref(), limit);
            }
            Panel::Outliers => {
                if let Ok(rows) = &dashboard.outliers {
                    let flagged = rows.iter().filter(|r| r.anomaly == 1).count();
                    output::field("Outliers", output::flagged(flagged));
                }
                table::<_, OutlierRow>(dashboard.outliers.as_deref(), limit);
            }
            Panel::DeliveryClusters => {
                table::<_, DeliveryClusterRow>(dashboard.delivery_clusters.as_deref(), limit);
            }
            Panel::Species => {
                table::<_, SpeciesRow>(dashboard.species.as_deref(), limit);
            }
            Panel::Decomposition => {
                if let Ok(decomposition) = &dashboard.decomposition {
                    output::field("Period", output::highlight(decomposition.period));
                }
                let points = dashboard
                    .decomposition
                    .as_ref()
                    .map(|d| d.points.as_slice());
                table::<_, DecompositionRow>(points, limit);
            }
        }
    }
}
