//! Boundary normalization: raw source rows into domain records.
//!
//! This is the only place that looks at loosely typed graph values. Rows
//! without a usable timestamp are dropped; malformed numeric fields are
//! coerced (quantities to 0.0) and reported with a `warn!`.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::id::UNKNOWN;
use crate::domain::quantity::tons_from_value;
use crate::domain::time::{day_from_value, timestamp_from_value};
use crate::domain::{
    DailyVesselCount, DeliveryId, DeliveryRecord, ExitEvent, FishDeliveryRecord, LocationId,
    TransportPingEvent, VesselId,
};
use crate::port::{RawDeliveryRow, RawExitRow, RawFishDeliveryRow, RawPingRow, RawVesselCountRow};

/// Delivery reports with a parseable date.
#[must_use]
pub fn deliveries(rows: &[RawDeliveryRow]) -> Vec<DeliveryRecord> {
    let mut dropped = 0usize;
    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            let Some(date) = timestamp_from_value(&row.date) else {
                dropped += 1;
                return None;
            };
            let tons = tons_from_value(Some(&row.qty_tons));
            if let Some(issue) = &tons.issue {
                warn!(date = %date, issue = %issue, "Malformed numeric field qty_tons, using 0.0");
            }
            Some(DeliveryRecord {
                date,
                qty_tons: tons.value,
            })
        })
        .collect();
    log_dropped("deliveries", dropped, records.len());
    records
}

/// Exit events with a parseable timestamp.
#[must_use]
pub fn exit_events(rows: &[RawExitRow]) -> Vec<ExitEvent> {
    let mut dropped = 0usize;
    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            let Some(exit_date) = timestamp_from_value(&row.exit_date) else {
                dropped += 1;
                return None;
            };
            Some(ExitEvent {
                exit_date,
                vessel_id: VesselId::new(text_or_unknown(&row.vessel_id)),
            })
        })
        .collect();
    log_dropped("exit_events", dropped, records.len());
    records
}

/// Vessel counts truncated to their calendar day.
///
/// Rows without a date or a usable count are dropped.
#[must_use]
pub fn vessel_counts(rows: &[RawVesselCountRow]) -> Vec<DailyVesselCount> {
    let mut dropped = 0usize;
    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            let date = day_from_value(&row.date);
            let count = number_from_value(&row.num_vessels)
                .filter(|n| *n >= 0.0)
                .map(|n| n.round() as u32);
            match (date, count) {
                (Some(date), Some(num_vessels)) => Some(DailyVesselCount { date, num_vessels }),
                (Some(date), None) => {
                    warn!(date = %date, raw = %row.num_vessels, "Malformed numeric field num_vessels, dropping row");
                    dropped += 1;
                    None
                }
                _ => {
                    dropped += 1;
                    None
                }
            }
        })
        .collect();
    log_dropped("vessel_counts", dropped, records.len());
    records
}

/// Transponder pings with a start time and a numeric dwell.
///
/// Negative dwells are kept here and rejected by the dwell expander.
#[must_use]
pub fn transport_pings(rows: &[RawPingRow]) -> Vec<TransportPingEvent> {
    let mut dropped = 0usize;
    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            let Some(start_time) = timestamp_from_value(&row.start_time) else {
                dropped += 1;
                return None;
            };
            let Some(dwell_seconds) = number_from_value(&row.dwell) else {
                warn!(start_time = %start_time, raw = %row.dwell, "Malformed numeric field dwell, dropping ping");
                dropped += 1;
                return None;
            };
            Some(TransportPingEvent {
                source_location: LocationId::new(text_or_unknown(&row.source_location)),
                vessel_id: VesselId::new(text_or_unknown(&row.vessel_id)),
                start_time,
                dwell_seconds,
            })
        })
        .collect();
    log_dropped("transport_pings", dropped, records.len());
    records
}

/// Fish delivery reports with defaults for missing fields.
///
/// Every row is kept; a missing or unparseable arrival date becomes `None`.
#[must_use]
pub fn fish_deliveries(rows: &[RawFishDeliveryRow]) -> Vec<FishDeliveryRecord> {
    rows.iter()
        .map(|row| {
            let delivery_id = DeliveryId::new(text_or_unknown(&row.deliveryreport_name));
            let tons = tons_from_value(Some(&row.qty_tons));
            if let Some(issue) = &tons.issue {
                warn!(delivery = %delivery_id, issue = %issue, "Malformed numeric field qty_tons, using 0.0");
            }
            let date_of_arrival = day_from_value(&row.date_of_arrival);
            if date_of_arrival.is_none() && !row.date_of_arrival.is_null() {
                warn!(delivery = %delivery_id, raw = %row.date_of_arrival, "Unparseable date_of_arrival");
            }
            FishDeliveryRecord {
                delivery_id,
                date_of_arrival,
                city_of_arrival: text_or_unknown(&row.city_of_arrival),
                fish_name: text_or_unknown(&row.fish_name),
                quantity_tons: tons.value,
                harbor_vessels: ensure_list(&row.harbor_vessels),
                ping_vessels: ensure_list(&row.ping_vessels),
            }
        })
        .collect()
}

/// Coerce a vessel field into a list of ids.
///
/// A scalar becomes a one-element list, `null` an empty one, and lists pass
/// through with null entries removed.
#[must_use]
pub fn ensure_list(value: &Value) -> Vec<VesselId> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter_map(scalar_text).map(VesselId::new).collect(),
        other => scalar_text(other).map(VesselId::new).into_iter().collect(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_or_unknown(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Read a number or numeric string (comma decimals accepted).
fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn log_dropped(table: &'static str, dropped: usize, kept: usize) {
    if dropped > 0 {
        warn!(table, dropped, kept, "Dropped rows without a usable timestamp or value");
    } else {
        debug!(table, kept, "Normalized rows");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2035, 1, d).unwrap()
    }

    #[test]
    fn deliveries_drop_bad_dates_and_coerce_quantities() {
        let rows = vec![
            RawDeliveryRow { date: json!("2035-01-02"), qty_tons: json!("3,5") },
            RawDeliveryRow { date: json!("yesterday"), qty_tons: json!(1.0) },
            RawDeliveryRow { date: json!("2035-01-03T10:00:00"), qty_tons: json!(-2) },
            RawDeliveryRow { date: json!("2035-01-04"), qty_tons: Value::Null },
        ];
        let records = deliveries(&rows);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].qty_tons, 3.5);
        assert_eq!(records[1].qty_tons, 0.0);
        assert_eq!(records[1].day(), day(3));
        assert_eq!(records[2].qty_tons, 0.0);
    }

    #[test]
    fn exit_events_default_missing_vessel() {
        let rows = vec![
            RawExitRow { exit_date: json!("2035-01-02T05:00:00"), vessel_id: Value::Null },
            RawExitRow { exit_date: Value::Null, vessel_id: json!("v-2") },
        ];
        let events = exit_events(&rows);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].vessel_id.as_str(), UNKNOWN);
    }

    #[test]
    fn vessel_counts_accept_numeric_strings() {
        let rows = vec![
            RawVesselCountRow { date: json!("2035-01-05T08:00:00"), num_vessels: json!("4") },
            RawVesselCountRow { date: json!("2035-01-05"), num_vessels: json!("many") },
            RawVesselCountRow { date: json!("2035-01-06"), num_vessels: json!(2) },
        ];
        let counts = vessel_counts(&rows);
        assert_eq!(
            counts,
            vec![
                DailyVesselCount { date: day(5), num_vessels: 4 },
                DailyVesselCount { date: day(6), num_vessels: 2 },
            ]
        );
    }

    #[test]
    fn pings_require_numeric_dwell() {
        let rows = vec![
            RawPingRow {
                source_location: json!("City of Paackland"),
                vessel_id: json!("v-1"),
                start_time: json!("2035-01-10T22:00:00"),
                dwell: json!(7200.0),
            },
            RawPingRow {
                source_location: json!("City of Paackland"),
                vessel_id: json!("v-2"),
                start_time: json!("2035-01-10T22:00:00"),
                dwell: json!("n/a"),
            },
        ];
        let pings = transport_pings(&rows);
        assert_eq!(pings.len(), 1);
        assert_eq!(pings[0].dwell_seconds, 7200.0);
    }

    #[test]
    fn ensure_list_normalizes_shapes() {
        assert_eq!(ensure_list(&json!("v-1")), vec![VesselId::from("v-1")]);
        assert!(ensure_list(&Value::Null).is_empty());
        assert_eq!(
            ensure_list(&json!(["a", null, "b"])),
            vec![VesselId::from("a"), VesselId::from("b")]
        );
    }

    #[test]
    fn fish_deliveries_fill_defaults() {
        let rows = vec![RawFishDeliveryRow {
            date_of_arrival: json!("2035-01-07"),
            qty_tons: json!("12,25"),
            harbor_vessels: json!("v-9"),
            ..RawFishDeliveryRow::default()
        }];
        let records = fish_deliveries(&rows);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.delivery_id.as_str(), UNKNOWN);
        assert_eq!(record.city_of_arrival, UNKNOWN);
        assert_eq!(record.fish_name, UNKNOWN);
        assert_eq!(record.date_of_arrival, Some(day(7)));
        assert_eq!(record.quantity_tons, 12.25);
        assert_eq!(record.harbor_vessels, vec![VesselId::from("v-9")]);
        assert!(record.ping_vessels.is_empty());
    }
}
