//! Domain types for maritime activity analysis.
//!
//! Everything here is plain data plus pure helpers; no I/O.

pub mod delivery;
pub mod error;
pub mod filter;
pub mod id;
pub mod quantity;
pub mod record;
pub mod stats;
pub mod time;
pub mod timeline;
pub mod window;

pub use delivery::{ClusteredDelivery, FishDeliveryRecord, ScoredDelivery, SpeciesTotal};
pub use error::DomainError;
pub use filter::{FilterKind, FilterSet};
pub use id::{DeliveryId, LocationId, VesselId};
pub use record::{
    ClusteredMatch, DeliveryRecord, DwellDayRecord, DwellInterval, ExitEvent, MatchedRecord,
    TransportPingEvent,
};
pub use timeline::{
    AnomalyDayRecord, AnomalyLabel, DailyQuantity, DailyVesselCount, Decomposition,
    DecompositionPoint, TemporalDayRecord,
};
pub use window::DateWindow;
