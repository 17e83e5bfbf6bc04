//! Daily timeline aggregation.
//!
//! Cargo quantities and vessel counts are fetched independently. Both are
//! reduced to one value per calendar day, outer-joined on the day and
//! forward-filled: a day missing from one series inherits that series' last
//! known value. Days before a series' first observation have nothing to
//! inherit and stay missing.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DailyQuantity, DailyVesselCount, DeliveryRecord, TemporalDayRecord};

/// Total cargo per calendar day, ascending by day.
#[must_use]
pub fn daily_quantities(deliveries: &[DeliveryRecord]) -> Vec<DailyQuantity> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for delivery in deliveries {
        *by_day.entry(delivery.day()).or_default() += delivery.qty_tons;
    }
    by_day
        .into_iter()
        .map(|(date, qty_tons)| DailyQuantity { date, qty_tons })
        .collect()
}

/// One distinct-vessel count per calendar day, ascending by day.
///
/// Sources already count distinct vessels per day, so a repeated day keeps
/// the largest count rather than adding vessels seen twice.
#[must_use]
pub fn daily_vessel_counts(counts: &[DailyVesselCount]) -> Vec<DailyVesselCount> {
    let mut by_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for count in counts {
        let slot = by_day.entry(count.date).or_default();
        *slot = (*slot).max(count.num_vessels);
    }
    by_day
        .into_iter()
        .map(|(date, num_vessels)| DailyVesselCount { date, num_vessels })
        .collect()
}

/// Merge both series into one forward-filled daily timeline.
#[must_use]
pub fn build_timeline(
    deliveries: &[DeliveryRecord],
    counts: &[DailyVesselCount],
) -> Vec<TemporalDayRecord> {
    let mut joined: BTreeMap<NaiveDate, (Option<f64>, Option<u32>)> = BTreeMap::new();
    for day in daily_quantities(deliveries) {
        joined.entry(day.date).or_default().0 = Some(day.qty_tons);
    }
    for day in daily_vessel_counts(counts) {
        joined.entry(day.date).or_default().1 = Some(day.num_vessels);
    }

    let mut last_qty = None;
    let mut last_vessels = None;
    let mut filled = 0usize;
    let timeline: Vec<TemporalDayRecord> = joined
        .into_iter()
        .map(|(date, (qty, vessels))| {
            let qty_filled = qty.is_none() && last_qty.is_some();
            let vessels_filled = vessels.is_none() && last_vessels.is_some();
            if qty_filled || vessels_filled {
                filled += 1;
            }
            last_qty = qty.or(last_qty);
            last_vessels = vessels.or(last_vessels);
            TemporalDayRecord {
                date,
                qty_tons: last_qty,
                num_vessels: last_vessels,
            }
        })
        .collect();

    debug!(days = timeline.len(), filled, "Built daily timeline");
    timeline
}
