//! Strongly-typed dashboard filters.
//!
//! Each dimension is an optional set of values. An empty set means the
//! dimension is unconstrained; a non-empty set matches any of its members.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The filterable dimensions of the activity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Company,
    City,
    Port,
    Region,
    Vessel,
    Species,
}

impl FilterKind {
    /// All dimensions in dropdown order.
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Company,
        FilterKind::City,
        FilterKind::Port,
        FilterKind::Region,
        FilterKind::Vessel,
        FilterKind::Species,
    ];

    /// Lowercase name used in configuration and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FilterKind::Company => "company",
            FilterKind::City => "city",
            FilterKind::Port => "port",
            FilterKind::Region => "region",
            FilterKind::Vessel => "vessel",
            FilterKind::Species => "species",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let singular = normalized
            .strip_suffix("ies")
            .map(|stem| format!("{stem}y"))
            .or_else(|| normalized.strip_suffix('s').map(str::to_owned))
            .unwrap_or_else(|| normalized.clone());
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized || kind.as_str() == singular)
            .ok_or_else(|| format!("unknown filter kind '{s}'"))
    }
}

/// Selected filter values for one dashboard request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub company: BTreeSet<String>,
    #[serde(default)]
    pub city: BTreeSet<String>,
    #[serde(default)]
    pub port: BTreeSet<String>,
    #[serde(default)]
    pub region: BTreeSet<String>,
    #[serde(default)]
    pub vessel: BTreeSet<String>,
    #[serde(default)]
    pub species: BTreeSet<String>,
}

impl FilterSet {
    /// A filter set that constrains nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values for one dimension, returning the updated set.
    #[must_use]
    pub fn with<I, S>(mut self, kind: FilterKind, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values_mut(kind).extend(
            values
                .into_iter()
                .map(Into::into)
                .filter(|value: &String| !value.trim().is_empty()),
        );
        self
    }

    /// Values selected for one dimension.
    #[must_use]
    pub fn values(&self, kind: FilterKind) -> &BTreeSet<String> {
        match kind {
            FilterKind::Company => &self.company,
            FilterKind::City => &self.city,
            FilterKind::Port => &self.port,
            FilterKind::Region => &self.region,
            FilterKind::Vessel => &self.vessel,
            FilterKind::Species => &self.species,
        }
    }

    fn values_mut(&mut self, kind: FilterKind) -> &mut BTreeSet<String> {
        match kind {
            FilterKind::Company => &mut self.company,
            FilterKind::City => &mut self.city,
            FilterKind::Port => &mut self.port,
            FilterKind::Region => &mut self.region,
            FilterKind::Vessel => &mut self.vessel,
            FilterKind::Species => &mut self.species,
        }
    }

    /// Dimensions with at least one selected value.
    pub fn active(&self) -> impl Iterator<Item = (FilterKind, &BTreeSet<String>)> {
        FilterKind::ALL
            .into_iter()
            .map(|kind| (kind, self.values(kind)))
            .filter(|(_, values)| !values.is_empty())
    }

    /// Copy of this set without the given dimension.
    ///
    /// Dropdown options for a dimension are computed from the other
    /// selections, never from the dimension's own.
    #[must_use]
    pub fn without(&self, kind: FilterKind) -> Self {
        let mut copy = self.clone();
        copy.values_mut(kind).clear();
        copy
    }

    /// True when no dimension is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// True when `value` passes the filter for `kind`.
    #[must_use]
    pub fn admits(&self, kind: FilterKind, value: &str) -> bool {
        let values = self.values(kind);
        values.is_empty() || values.contains(value)
    }
}
