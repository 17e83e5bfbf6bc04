//! Cypher query construction.
//!
//! Every user-supplied value travels as a bound parameter; the statement
//! text only ever contains fixed labels, property names and parameter
//! placeholders.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{DateWindow, FilterKind, FilterSet};
use crate::port::QueryScope;

use crate::adapter::outbound::fixture::location_filter;

const VESSEL_LABELS: &str = "(v:`Entity.Vessel.FishingVessel` OR v:`Entity.Vessel.CargoVessel`)";
const LOCATION_LABELS: &str =
    "(l:`Entity.Location.City` OR l:`Entity.Location.Point` OR l:`Entity.Location.Region`)";

/// A named Cypher statement with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CypherQuery {
    #[serde(skip)]
    pub name: &'static str,
    pub statement: String,
    pub parameters: Map<String, Value>,
}

impl CypherQuery {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            statement: String::new(),
            parameters: Map::new(),
        }
    }

    fn bind(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    fn bind_window(self, window: &DateWindow) -> Self {
        self.bind("start_date", window.start_param().map_or(Value::Null, Value::from))
            .bind("end_date", window.end_param().map_or(Value::Null, Value::from))
    }

    /// Delivery report dates and quantities.
    #[must_use]
    pub fn delivery_qty(scope: &QueryScope) -> Self {
        let mut query = Self::new("fetch_delivery_qty").bind_window(&scope.window);
        query.statement = format!(
            "MATCH (d:`Entity.Document.DeliveryReport`)\n\
             WHERE {}\n\
             RETURN d.date AS date, d.qty_tons AS qty_tons",
            window_clause("d.date")
        );
        query
    }

    /// Ping edges read as vessel exits.
    #[must_use]
    pub fn exit_events(scope: &QueryScope) -> Self {
        let mut query = Self::new("fetch_exit_events").bind_window(&scope.window);
        let mut conditions = vec![window_clause("e.time")];
        query = query.bind_filter(&mut conditions, &scope.filters, FilterKind::Vessel, "e.target");
        query.statement = format!(
            "MATCH ()-[e:`Event.TransportEvent.TransponderPing`]->()\n\
             WHERE {}\n\
             RETURN e.time AS exit_date, e.target AS vessel_id",
            conditions.join("\n  AND ")
        );
        query
    }

    /// Distinct vessels pinged per calendar day.
    #[must_use]
    pub fn vessel_counts(scope: &QueryScope) -> Self {
        let mut query = Self::new("fetch_vessel_counts").bind_window(&scope.window);
        query.statement = format!(
            "MATCH (l)-[r:`Event.TransportEvent.TransponderPing`]->(v)\n\
             WHERE {}\n  AND {LOCATION_LABELS}\n  AND {VESSEL_LABELS}\n\
             RETURN date(substring(toString(r.time), 0, 10)) AS date,\n       \
             COUNT(DISTINCT v) AS num_vessels\n\
             ORDER BY date",
            window_clause("r.time")
        );
        query
    }

    /// Pings with dwell times.
    #[must_use]
    pub fn transport_pings(scope: &QueryScope) -> Self {
        let mut query = Self::new("fetch_transport_pings").bind_window(&scope.window);
        let mut conditions = vec![
            window_clause("r.time"),
            LOCATION_LABELS.to_string(),
            VESSEL_LABELS.to_string(),
        ];
        query = query.bind_filter(&mut conditions, &scope.filters, FilterKind::Vessel, "v.id");
        let locations = location_filter(&scope.filters);
        if !locations.is_empty() {
            conditions.push("l.id IN $locations".to_string());
            query = query.bind("locations", locations.into_iter().collect::<Vec<_>>());
        }
        query.statement = format!(
            "MATCH (l)-[r:`Event.TransportEvent.TransponderPing`]->(v)\n\
             WHERE {}\n\
             RETURN l.id AS source_location, v.id AS vessel_id, r.time AS start_time, r.dwell AS dwell",
            conditions.join("\n  AND ")
        );
        query
    }

    /// Delivery reports with arrival city, species and nearby vessels.
    #[must_use]
    pub fn fish_deliveries(scope: &QueryScope) -> Self {
        let mut query = Self::new("fetch_fish_deliveries").bind_window(&scope.window);
        let mut conditions = Vec::new();
        query = query.bind_filter(&mut conditions, &scope.filters, FilterKind::City, "city_of_arrival");
        query = query.bind_filter(&mut conditions, &scope.filters, FilterKind::Species, "fish_name");
        let narrowing = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}\n", conditions.join(" AND "))
        };
        query.statement = format!(
            "MATCH (cargo:`Entity.Document.DeliveryReport`)-[:`Event.Transaction`]->(t)\n\
             WHERE {}\n  AND (t:`Entity.Commodity.Fish` OR t:`Entity.Location.City`)\n\
             WITH cargo,\n     \
               cargo.id AS deliveryreport_name,\n     \
               cargo.date AS date_of_arrival,\n     \
               cargo.qty_tons AS qty_tons,\n     \
               COLLECT(CASE WHEN t:`Entity.Location.City` THEN t.id END)[0] AS city_of_arrival,\n     \
               COLLECT(CASE WHEN t:`Entity.Commodity.Fish` THEN t.id END)[0] AS fish_name\n\
             {narrowing}\
             OPTIONAL MATCH (hv)-[harbor:`Event.HarborReport`]->(:`Entity.Location.City`)\n\
             WHERE (hv:`Entity.Vessel.FishingVessel` OR hv:`Entity.Vessel.CargoVessel`)\n  \
               AND harbor.target = city_of_arrival\n  \
               AND (date(cargo.date) = date(harbor.date) OR date(cargo.date) + duration('P1D') = date(harbor.date))\n\
             WITH cargo, deliveryreport_name, date_of_arrival, qty_tons, city_of_arrival, fish_name,\n     \
               COLLECT(harbor.source) AS harbor_vessels\n\
             OPTIONAL MATCH (:`Entity.Location.City`)-[ping:`Event.TransportEvent.TransponderPing`]->(pv)\n\
             WHERE (pv:`Entity.Vessel.FishingVessel` OR pv:`Entity.Vessel.CargoVessel`)\n  \
               AND ping.source = city_of_arrival\n  \
               AND date(cargo.date) = date(substring(ping.time, 0, 10))\n\
             RETURN deliveryreport_name, date_of_arrival, city_of_arrival, fish_name, qty_tons,\n       \
               harbor_vessels, COLLECT(ping.target) AS ping_vessels",
            window_clause("cargo.date")
        );
        query
    }

    /// Dropdown values for one dimension.
    ///
    /// Nodes are narrowed by the other dimensions' selections through
    /// properties of the same name (`n.company`, `n.city`, ...).
    #[must_use]
    pub fn options(kind: FilterKind, filters: &FilterSet) -> Self {
        let mut query = Self::new("list_options");
        let mut conditions = vec![node_labels(kind).to_string()];
        let filters = filters.without(kind);
        for (other, _) in filters.active() {
            let property = format!("n.{}", other.as_str());
            query = query.bind_filter(&mut conditions, &filters, other, &property);
        }
        let value = match kind {
            FilterKind::Company => "n.company",
            _ => "n.id",
        };
        query.statement = format!(
            "MATCH (n)\n\
             WHERE {}\n  AND {value} IS NOT NULL\n\
             RETURN DISTINCT {value} AS value\n\
             ORDER BY value",
            conditions.join("\n  AND ")
        );
        query
    }

    fn bind_filter(
        self,
        conditions: &mut Vec<String>,
        filters: &FilterSet,
        kind: FilterKind,
        expression: &str,
    ) -> Self {
        let values = filters.values(kind);
        if values.is_empty() {
            return self;
        }
        let key = format!("{}_filter", kind.as_str());
        conditions.push(format!("{expression} IN ${key}"));
        self.bind(&key, values.iter().cloned().collect::<Vec<_>>())
    }
}

fn window_clause(column: &str) -> String {
    format!(
        "({column} >= $start_date OR $start_date IS NULL) AND ({column} < $end_date OR $end_date IS NULL)"
    )
}

fn node_labels(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Company | FilterKind::Vessel => {
            "(n:`Entity.Vessel.CargoVessel` OR n:`Entity.Vessel.FishingVessel`)"
        }
        FilterKind::City => "n:`Entity.Location.City`",
        FilterKind::Port => "n:`Entity.Location.Point`",
        FilterKind::Region => "n:`Entity.Location.Region`",
        FilterKind::Species => "n:`Entity.Commodity.Fish`",
    }
}
