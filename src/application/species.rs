//! Species breakdown per arrival city.

use std::collections::BTreeMap;

use crate::domain::{FishDeliveryRecord, SpeciesTotal};

/// Total delivered quantity per (city, species), largest first.
///
/// Deliveries with no positive quantity are left out.
#[must_use]
pub fn species_breakdown(records: &[FishDeliveryRecord]) -> Vec<SpeciesTotal> {
    let mut totals: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.quantity_tons > 0.0) {
        let entry = totals
            .entry((record.city_of_arrival.as_str(), record.fish_name.as_str()))
            .or_default();
        entry.0 += record.quantity_tons;
        entry.1 += 1;
    }
    let mut breakdown: Vec<SpeciesTotal> = totals
        .into_iter()
        .map(|((city, fish), (quantity_tons, deliveries))| SpeciesTotal {
            city_of_arrival: city.to_string(),
            fish_name: fish.to_string(),
            quantity_tons,
            deliveries,
        })
        .collect();
    // Stable sort keeps (city, fish) order among equal totals.
    breakdown.sort_by(|a, b| b.quantity_tons.total_cmp(&a.quantity_tons));
    breakdown
}
