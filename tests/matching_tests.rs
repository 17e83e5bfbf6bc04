use oceanus::application::matching::AsofMatcher;
use oceanus::testkit::records::{delivery, exit, ts};

#[test]
fn nearest_exit_inside_tolerance_wins() {
    let matcher = AsofMatcher::from_hours(24);
    let matched = matcher.match_exits(
        &[delivery("2035-01-10T12:00:00", 5.0)],
        &[
            exit("2035-01-09T13:00:00", "near"),
            exit("2035-01-11T13:00:00", "far"),
        ],
    );
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].vessel_id.as_str(), "near");
    assert_eq!(matched[0].exit_date, ts("2035-01-09T13:00:00"));
    assert_eq!(matched[0].hour, 13);
}

#[test]
fn equidistant_candidates_pick_the_earlier_exit() {
    let matcher = AsofMatcher::default();
    let matched = matcher.match_exits(
        &[delivery("2035-01-10T12:00:00", 5.0)],
        &[
            exit("2035-01-10T15:00:00", "later"),
            exit("2035-01-10T09:00:00", "earlier"),
        ],
    );
    assert_eq!(matched[0].vessel_id.as_str(), "earlier");
}

#[test]
fn exits_beyond_tolerance_are_never_matched() {
    let matcher = AsofMatcher::from_hours(24);
    let matched = matcher.match_exits(
        &[delivery("2035-01-10T12:00:00", 5.0)],
        &[exit("2035-01-11T12:00:01", "late"), exit("2035-01-09T11:59:59", "early")],
    );
    assert!(matched.is_empty());
}

#[test]
fn gap_equal_to_tolerance_is_matched() {
    let matcher = AsofMatcher::from_hours(24);
    let matched = matcher.match_exits(
        &[delivery("2035-01-10T12:00:00", 5.0)],
        &[exit("2035-01-11T12:00:00", "edge")],
    );
    assert_eq!(matched.len(), 1);
}

#[test]
fn every_delivery_within_tolerance_is_matched() {
    let matcher = AsofMatcher::default();
    let deliveries: Vec<_> = (0..6)
        .map(|h| delivery(&format!("2035-01-10T{:02}:00:00", 8 + h), 1.0))
        .collect();
    let exits = vec![
        exit("2035-01-10T09:30:00", "a"),
        exit("2035-01-10T11:30:00", "b"),
    ];
    let matched = matcher.match_exits(&deliveries, &exits);
    assert_eq!(matched.len(), deliveries.len());
    let vessels: Vec<&str> = matched.iter().map(|m| m.vessel_id.as_str()).collect();
    assert_eq!(vessels, ["a", "a", "a", "b", "b", "b"]);
}

#[test]
fn one_exit_serves_every_nearby_delivery() {
    let matcher = AsofMatcher::default();
    let matched = matcher.match_exits(
        &[
            delivery("2035-01-10T08:00:00", 1.0),
            delivery("2035-01-10T10:00:00", 2.0),
            delivery("2035-01-10T12:00:00", 3.0),
        ],
        &[exit("2035-01-10T10:00:00", "only")],
    );
    assert_eq!(matched.len(), 3);
    assert!(matched.iter().all(|m| m.vessel_id.as_str() == "only"));
    assert!(matched
        .iter()
        .all(|m| m.exit_date == ts("2035-01-10T10:00:00")));
}

#[test]
fn a_contested_exit_does_not_push_deliveries_to_farther_exits() {
    let matcher = AsofMatcher::default();
    let matched = matcher.match_exits(
        &[
            delivery("2035-01-10T10:00:00", 1.0),
            delivery("2035-01-10T11:00:00", 2.0),
        ],
        &[
            exit("2035-01-10T10:30:00", "near"),
            exit("2035-01-10T20:00:00", "far"),
        ],
    );
    assert_eq!(matched.len(), 2);
    assert!(matched.iter().all(|m| m.vessel_id.as_str() == "near"));
}

#[test]
fn matching_is_deterministic_regardless_of_input_order() {
    let matcher = AsofMatcher::default();
    let deliveries = vec![
        delivery("2035-01-12T08:00:00", 3.0),
        delivery("2035-01-10T08:00:00", 1.0),
        delivery("2035-01-11T08:00:00", 2.0),
    ];
    let exits = vec![
        exit("2035-01-11T06:00:00", "b"),
        exit("2035-01-10T05:00:00", "a"),
        exit("2035-01-12T07:00:00", "c"),
    ];
    let forward = matcher.match_exits(&deliveries, &exits);
    let mut reversed_deliveries = deliveries.clone();
    reversed_deliveries.reverse();
    let mut reversed_exits = exits.clone();
    reversed_exits.reverse();
    let backward = matcher.match_exits(&reversed_deliveries, &reversed_exits);
    assert_eq!(forward, backward);
    let vessels: Vec<&str> = forward.iter().map(|m| m.vessel_id.as_str()).collect();
    assert_eq!(vessels, vec!["a", "b", "c"]);
}
