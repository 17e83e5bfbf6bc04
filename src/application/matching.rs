//! Asof matching of deliveries to vessel exit events.
//!
//! Each delivery is paired with the exit event nearest to it in time, in
//! either direction, provided the gap is within the tolerance (inclusive).
//! Deliveries are matched independently, so one exit event may serve
//! several deliveries.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::domain::{DeliveryRecord, ExitEvent, MatchedRecord};

/// Default matching tolerance in hours.
pub const DEFAULT_TOLERANCE_HOURS: u32 = 24;

/// Nearest-neighbour matcher with a symmetric time tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsofMatcher {
    tolerance: Duration,
}

impl Default for AsofMatcher {
    fn default() -> Self {
        Self::from_hours(DEFAULT_TOLERANCE_HOURS)
    }
}

impl AsofMatcher {
    #[must_use]
    pub fn new(tolerance: Duration) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    #[must_use]
    pub fn from_hours(hours: u32) -> Self {
        Self::new(Duration::hours(i64::from(hours)))
    }

    #[must_use]
    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Match deliveries to exits.
    ///
    /// Unmatched deliveries are dropped. The result is ordered by delivery
    /// date. Several deliveries may share one exit.
    #[must_use]
    pub fn match_exits(
        &self,
        deliveries: &[DeliveryRecord],
        exits: &[ExitEvent],
    ) -> Vec<MatchedRecord> {
        if deliveries.is_empty() || exits.is_empty() {
            return Vec::new();
        }

        let mut deliveries: Vec<&DeliveryRecord> = deliveries.iter().collect();
        deliveries.sort_by_key(|d| d.date);
        let mut exits: Vec<&ExitEvent> = exits.iter().collect();
        exits.sort_by_key(|e| e.exit_date);

        let matched: Vec<MatchedRecord> = deliveries
            .iter()
            .filter_map(|delivery| {
                self.nearest(&exits, delivery.date)
                    .map(|exit| MatchedRecord::new(delivery, exit))
            })
            .collect();

        debug!(
            deliveries = deliveries.len(),
            exits = exits.len(),
            matched = matched.len(),
            "Asof matching complete"
        );
        matched
    }

    /// Closest exit to `at` within tolerance; `exits` must be sorted.
    ///
    /// Equidistant candidates resolve to the earlier exit, and exits sharing
    /// a timestamp resolve to the first in input order.
    fn nearest<'a>(&self, exits: &[&'a ExitEvent], at: NaiveDateTime) -> Option<&'a ExitEvent> {
        let split = exits.partition_point(|e| e.exit_date < at);
        let before = split.checked_sub(1).map(|i| {
            let first = exits.partition_point(|e| e.exit_date < exits[i].exit_date);
            exits[first]
        });
        let after = exits.get(split).copied();

        let gap = |exit: &ExitEvent| (at - exit.exit_date).abs();
        let best = match (before, after) {
            (Some(b), Some(a)) if gap(a) < gap(b) => a,
            (Some(b), _) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
        (gap(best) <= self.tolerance).then_some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VesselId;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2035, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn delivery(d: u32, h: u32, qty: f64) -> DeliveryRecord {
        DeliveryRecord {
            date: at(d, h),
            qty_tons: qty,
        }
    }

    fn exit(d: u32, h: u32, vessel: &str) -> ExitEvent {
        ExitEvent {
            exit_date: at(d, h),
            vessel_id: VesselId::from(vessel),
        }
    }

    #[test]
    fn nearest_exit_within_tolerance_wins() {
        let matched = AsofMatcher::default().match_exits(
            &[delivery(10, 12, 5.0)],
            &[exit(9, 13, "A"), exit(10, 20, "B")],
        );
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].vessel_id.as_str(), "B");
        assert_eq!(matched[0].hour, 20);
        assert_eq!(matched[0].qty_tons, 5.0);
    }

    #[test]
    fn exit_beyond_tolerance_is_dropped() {
        let matched =
            AsofMatcher::default().match_exits(&[delivery(10, 12, 5.0)], &[exit(8, 0, "A")]);
        assert!(matched.is_empty());
    }

    #[test]
    fn tolerance_is_inclusive() {
        let matched =
            AsofMatcher::default().match_exits(&[delivery(10, 12, 5.0)], &[exit(11, 12, "A")]);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn tie_goes_to_earlier_exit() {
        let matched = AsofMatcher::default().match_exits(
            &[delivery(10, 12, 1.0)],
            &[exit(10, 15, "late"), exit(10, 9, "early")],
        );
        assert_eq!(matched[0].vessel_id.as_str(), "early");
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        let matcher = AsofMatcher::default();
        assert!(matcher.match_exits(&[], &[exit(1, 0, "A")]).is_empty());
        assert!(matcher.match_exits(&[delivery(1, 0, 1.0)], &[]).is_empty());
    }

    #[test]
    fn each_delivery_takes_its_own_nearest_exit() {
        let matched = AsofMatcher::default().match_exits(
            &[delivery(10, 7, 1.0), delivery(10, 11, 2.0)],
            &[exit(10, 12, "shared"), exit(10, 0, "other")],
        );
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].vessel_id.as_str(), "shared");
        assert_eq!(matched[1].vessel_id.as_str(), "shared");
    }

    #[test]
    fn same_timestamp_exits_resolve_to_input_order() {
        let matched = AsofMatcher::default().match_exits(
            &[delivery(10, 12, 1.0)],
            &[exit(10, 10, "first"), exit(10, 10, "second")],
        );
        assert_eq!(matched[0].vessel_id.as_str(), "first");
    }

    #[test]
    fn output_is_ordered_and_within_tolerance() {
        let deliveries: Vec<_> = (1..=6).rev().map(|d| delivery(d, 8, f64::from(d))).collect();
        let exits = vec![exit(2, 9, "A"), exit(4, 7, "B")];
        let matched = AsofMatcher::default().match_exits(&deliveries, &exits);
        // Days 1, 5 and 6 are 25h or more from both exits.
        assert_eq!(matched.len(), 3);
        assert!(matched
            .windows(2)
            .all(|w| w[0].delivery_date <= w[1].delivery_date));
        assert!(matched.iter().all(|m| m.gap() <= Duration::hours(24)));
    }
}
