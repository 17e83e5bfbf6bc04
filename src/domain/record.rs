//! Activity records: deliveries, vessel exits, transponder pings.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use super::error::DomainError;
use super::id::{LocationId, VesselId};

/// A delivery report reduced to when it landed and how much.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRecord {
    /// Delivery timestamp; date-only reports resolve to midnight.
    #[serde(with = "iso_datetime")]
    pub date: NaiveDateTime,
    /// Cargo quantity in tons, never negative.
    pub qty_tons: f64,
}

impl DeliveryRecord {
    /// Calendar day of the delivery.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// A vessel leaving a location, taken from a transponder ping edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitEvent {
    #[serde(with = "iso_datetime")]
    pub exit_date: NaiveDateTime,
    pub vessel_id: VesselId,
}

/// A delivery paired with the exit event nearest to it in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRecord {
    #[serde(with = "iso_datetime")]
    pub delivery_date: NaiveDateTime,
    pub qty_tons: f64,
    #[serde(with = "iso_datetime")]
    pub exit_date: NaiveDateTime,
    pub vessel_id: VesselId,
    /// Hour of day (0-23) of the matched exit.
    pub hour: u32,
}

impl MatchedRecord {
    /// Pair a delivery with an exit event.
    #[must_use]
    pub fn new(delivery: &DeliveryRecord, exit: &ExitEvent) -> Self {
        Self {
            delivery_date: delivery.date,
            qty_tons: delivery.qty_tons,
            exit_date: exit.exit_date,
            vessel_id: exit.vessel_id.clone(),
            hour: exit.exit_date.hour(),
        }
    }

    /// Absolute time between the delivery and its exit event.
    #[must_use]
    pub fn gap(&self) -> Duration {
        (self.delivery_date - self.exit_date).abs()
    }
}

/// A matched record with its cluster label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteredMatch {
    #[serde(flatten)]
    pub record: MatchedRecord,
    pub cluster: usize,
}

/// A transponder ping: a vessel observed at a location for `dwell_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportPingEvent {
    pub source_location: LocationId,
    pub vessel_id: VesselId,
    #[serde(with = "iso_datetime")]
    pub start_time: NaiveDateTime,
    pub dwell_seconds: f64,
}

/// A validated `[start, end)` dwell interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
    seconds: f64,
}

impl DwellInterval {
    /// Build the interval `[start, start + dwell_seconds)`.
    ///
    /// # Errors
    ///
    /// Fails if the dwell is negative or not finite, or if the end time is
    /// not representable.
    pub fn try_new(start: NaiveDateTime, dwell_seconds: f64) -> Result<Self, DomainError> {
        if !dwell_seconds.is_finite() || dwell_seconds < 0.0 {
            return Err(DomainError::InvalidDwell {
                seconds: dwell_seconds,
            });
        }
        let micros = (dwell_seconds * 1_000_000.0).round();
        if micros > i64::MAX as f64 {
            return Err(DomainError::DwellOverflow {
                start: start.to_string(),
            });
        }
        let end = start
            .checked_add_signed(Duration::microseconds(micros as i64))
            .ok_or_else(|| DomainError::DwellOverflow {
                start: start.to_string(),
            })?;
        Ok(Self {
            start,
            end,
            seconds: dwell_seconds,
        })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Total dwell in seconds, exactly as reported.
    #[must_use]
    pub const fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Midnight that closes the calendar day `day`.
    #[must_use]
    pub fn day_end(day: NaiveDate) -> Option<NaiveDateTime> {
        day.checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN))
    }
}

/// Portion of one ping's dwell time that falls on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DwellDayRecord {
    pub date: NaiveDate,
    pub location_id: LocationId,
    pub vessel_id: VesselId,
    pub dwell_seconds: f64,
}

/// Serialize naive timestamps as `YYYY-MM-DDTHH:MM:SS`.
pub(crate) mod iso_datetime {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2035, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn matched_record_takes_hour_from_exit() {
        let delivery = DeliveryRecord {
            date: at(10, 12),
            qty_tons: 4.5,
        };
        let exit = ExitEvent {
            exit_date: at(9, 13),
            vessel_id: VesselId::from("v-1"),
        };
        let matched = MatchedRecord::new(&delivery, &exit);
        assert_eq!(matched.hour, 13);
        assert_eq!(matched.gap(), Duration::hours(23));
    }

    #[test]
    fn matched_record_serializes_iso_timestamps() {
        let matched = MatchedRecord {
            delivery_date: at(10, 12),
            qty_tons: 1.0,
            exit_date: at(10, 6),
            vessel_id: VesselId::from("v-1"),
            hour: 6,
        };
        let json = serde_json::to_value(&matched).unwrap();
        assert_eq!(json["delivery_date"], "2035-01-10T12:00:00");
        assert_eq!(json["exit_date"], "2035-01-10T06:00:00");
    }

    #[test]
    fn dwell_interval_rejects_negative_and_nan() {
        assert!(DwellInterval::try_new(at(1, 0), -1.0).is_err());
        assert!(DwellInterval::try_new(at(1, 0), f64::NAN).is_err());
        assert!(DwellInterval::try_new(at(1, 0), f64::INFINITY).is_err());
    }

    #[test]
    fn dwell_interval_computes_end() {
        let interval = DwellInterval::try_new(at(10, 22), 7200.0).unwrap();
        assert_eq!(interval.end(), at(11, 0));
        assert_eq!(interval.seconds(), 7200.0);
    }
}
