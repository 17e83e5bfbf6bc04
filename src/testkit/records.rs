//! Builders for domain records.
//!
//! Timestamps are given as `YYYY-MM-DDTHH:MM:SS` (or any shape
//! [`parse_timestamp`] accepts) and panic when malformed.

use chrono::NaiveDateTime;

use crate::domain::time::parse_timestamp;
use crate::domain::{
    DeliveryId, DeliveryRecord, ExitEvent, FishDeliveryRecord, LocationId, TransportPingEvent,
    VesselId,
};

/// Parse a test timestamp.
pub fn ts(raw: &str) -> NaiveDateTime {
    parse_timestamp(raw).unwrap_or_else(|| panic!("invalid test timestamp '{raw}'"))
}

pub fn delivery(at: &str, qty_tons: f64) -> DeliveryRecord {
    DeliveryRecord {
        date: ts(at),
        qty_tons,
    }
}

pub fn exit(at: &str, vessel: &str) -> ExitEvent {
    ExitEvent {
        exit_date: ts(at),
        vessel_id: VesselId::new(vessel),
    }
}

pub fn ping(location: &str, vessel: &str, at: &str, dwell_seconds: f64) -> TransportPingEvent {
    TransportPingEvent {
        source_location: LocationId::new(location),
        vessel_id: VesselId::new(vessel),
        start_time: ts(at),
        dwell_seconds,
    }
}

/// A fish delivery with no harbor or ping vessels.
pub fn fish_delivery(id: &str, day: &str, city: &str, fish: &str, qty_tons: f64) -> FishDeliveryRecord {
    FishDeliveryRecord {
        delivery_id: DeliveryId::new(id),
        date_of_arrival: Some(ts(day).date()),
        city_of_arrival: city.to_string(),
        fish_name: fish.to_string(),
        quantity_tons: qty_tons,
        harbor_vessels: Vec::new(),
        ping_vessels: Vec::new(),
    }
}
