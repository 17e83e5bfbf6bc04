//! Expansion of transponder dwell intervals into per-day rows.
//!
//! A ping at `start_time` with `dwell` seconds covers `[start, start + dwell)`.
//! The interval is cut at every midnight it crosses; each piece becomes one
//! [`DwellDayRecord`]. Whole days count 86 400 s. The last piece takes
//! whatever remains of the reported dwell, so the pieces always sum to it
//! exactly.

use tracing::{debug, warn};

use crate::domain::{DwellDayRecord, DwellInterval, TransportPingEvent};

/// Expand one ping.
///
/// Returns no rows when the dwell is negative, not finite or overflows.
#[must_use]
pub fn expand_ping(ping: &TransportPingEvent) -> Vec<DwellDayRecord> {
    let interval = match DwellInterval::try_new(ping.start_time, ping.dwell_seconds) {
        Ok(interval) => interval,
        Err(e) => {
            warn!(
                vessel = %ping.vessel_id,
                location = %ping.source_location,
                error = %e,
                "Skipping ping with invalid dwell"
            );
            return Vec::new();
        }
    };

    let record = |date, dwell_seconds| DwellDayRecord {
        date,
        location_id: ping.source_location.clone(),
        vessel_id: ping.vessel_id.clone(),
        dwell_seconds,
    };

    let last_day = interval.end().date();
    let mut rows = Vec::new();
    let mut allocated = 0.0;
    let mut cursor = interval.start();
    let mut day = cursor.date();
    while day < last_day {
        let Some(midnight) = DwellInterval::day_end(day) else {
            break;
        };
        let piece = (midnight - cursor).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0;
        rows.push(record(day, piece));
        allocated += piece;
        cursor = midnight;
        day = midnight.date();
    }
    rows.push(record(last_day, interval.seconds() - allocated));
    rows
}

/// Expand every ping, preserving input order.
#[must_use]
pub fn expand_pings(pings: &[TransportPingEvent]) -> Vec<DwellDayRecord> {
    let rows: Vec<DwellDayRecord> = pings.iter().flat_map(expand_ping).collect();
    debug!(pings = pings.len(), rows = rows.len(), "Expanded dwell intervals");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationId, VesselId};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2035, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn ping(start: NaiveDateTime, dwell: f64) -> TransportPingEvent {
        TransportPingEvent {
            source_location: LocationId::from("City of Haacklee"),
            vessel_id: VesselId::from("v-1"),
            start_time: start,
            dwell_seconds: dwell,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2035, 1, d).unwrap()
    }

    #[test]
    fn same_day_dwell_is_one_row() {
        let rows = expand_ping(&ping(at(10, 8, 0), 3600.0));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(10));
        assert_eq!(rows[0].dwell_seconds, 3600.0);
    }

    #[test]
    fn dwell_ending_at_midnight_emits_zero_second_end_day() {
        let rows = expand_ping(&ping(at(10, 22, 0), 7200.0));
        let split: Vec<_> = rows.iter().map(|r| (r.date, r.dwell_seconds)).collect();
        assert_eq!(split, vec![(day(10), 7200.0), (day(11), 0.0)]);
    }

    #[test]
    fn multi_day_dwell_has_full_days_in_the_middle() {
        let rows = expand_ping(&ping(at(10, 18, 0), 6.0 * 3600.0 + 2.0 * 86_400.0 + 1800.0));
        let split: Vec<_> = rows.iter().map(|r| (r.date, r.dwell_seconds)).collect();
        assert_eq!(
            split,
            vec![
                (day(10), 21_600.0),
                (day(11), 86_400.0),
                (day(12), 86_400.0),
                (day(13), 1800.0),
            ]
        );
    }

    #[test]
    fn pieces_sum_to_original_dwell() {
        for dwell in [0.0, 0.25, 59.9, 3599.5, 86_400.0, 200_000.125, 1_000_000.0] {
            let rows = expand_ping(&ping(at(3, 23, 59), dwell));
            let total: f64 = rows.iter().map(|r| r.dwell_seconds).sum();
            assert!((total - dwell).abs() < 1e-6, "dwell {dwell} summed to {total}");
        }
    }

    #[test]
    fn negative_dwell_is_skipped() {
        assert!(expand_ping(&ping(at(3, 0, 0), -10.0)).is_empty());
        let rows = expand_pings(&[ping(at(3, 0, 0), -10.0), ping(at(4, 0, 0), 10.0)]);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn zero_dwell_yields_single_zero_row() {
        let rows = expand_ping(&ping(at(5, 12, 0), 0.0));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dwell_seconds, 0.0);
    }
}
