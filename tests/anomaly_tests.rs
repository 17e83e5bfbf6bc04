use oceanus::application::aggregate::build_timeline;
use oceanus::application::anomaly::{IsolationForest, RollingDetector};
use oceanus::domain::{AnomalyLabel, DailyVesselCount, TemporalDayRecord};
use oceanus::testkit::records::delivery;
use oceanus::testkit::settings::day;

fn series(quantities: &[f64]) -> Vec<TemporalDayRecord> {
    quantities
        .iter()
        .enumerate()
        .map(|(i, qty)| TemporalDayRecord {
            date: day(2035, 1, 1) + chrono::Days::new(i as u64),
            qty_tons: Some(*qty),
            num_vessels: Some(5),
        })
        .collect()
}

#[test]
fn constant_series_has_no_anomalies() {
    let labeled = RollingDetector::default().detect(&series(&[100.0; 40]));
    assert_eq!(labeled.len(), 40);
    assert!(labeled.iter().all(|r| r.anomaly == AnomalyLabel::Normal));
    assert!(labeled.iter().all(|r| r.z_score_qty.map_or(true, |z| z == 0.0)));
}

#[test]
fn single_spike_is_flagged_and_neighbors_are_not() {
    let mut quantities = vec![100.0; 35];
    quantities[31] = 1000.0;
    let labeled = RollingDetector::default().detect(&series(&quantities));

    assert_eq!(labeled[31].anomaly, AnomalyLabel::Anomaly);
    assert_eq!(labeled[30].anomaly, AnomalyLabel::Normal);
    assert_eq!(labeled[32].anomaly, AnomalyLabel::Normal);
    let flagged = labeled.iter().filter(|r| r.anomaly.is_anomaly()).count();
    assert_eq!(flagged, 1);
}

#[test]
fn higher_threshold_suppresses_the_spike() {
    let mut quantities = vec![100.0; 35];
    quantities[31] = 1000.0;
    let labeled = RollingDetector::new(7, 3.0).detect(&series(&quantities));
    assert!(labeled.iter().all(|r| r.anomaly == AnomalyLabel::Normal));
}

#[test]
fn detector_runs_on_a_built_timeline() {
    let deliveries = vec![
        delivery("2035-01-01T10:00:00", 4.0),
        delivery("2035-01-03T10:00:00", 6.0),
    ];
    let counts = vec![DailyVesselCount {
        date: day(2035, 1, 2),
        num_vessels: 3,
    }];
    let labeled = RollingDetector::default().detect(&build_timeline(&deliveries, &counts));
    assert_eq!(labeled.len(), 3);
    assert_eq!(labeled[0].rolling_std_qty, None);
}

#[test]
fn first_vessel_observation_after_a_gap_is_not_flagged() {
    let deliveries: Vec<_> = (1..=10)
        .map(|d| delivery(&format!("2035-01-{d:02}T09:00:00"), 10.0))
        .collect();
    let counts: Vec<_> = (7..=10)
        .map(|d| DailyVesselCount {
            date: day(2035, 1, d),
            num_vessels: 20,
        })
        .collect();
    let labeled = RollingDetector::default().detect(&build_timeline(&deliveries, &counts));

    assert_eq!(labeled.len(), 10);
    assert!(labeled[..6].iter().all(|r| r.day.num_vessels.is_none()));
    let jan7 = &labeled[6];
    assert_eq!(jan7.day.date, day(2035, 1, 7));
    assert_eq!(jan7.z_score_vessels, None);
    assert_eq!(jan7.anomaly, AnomalyLabel::Normal);
    assert!(labeled.iter().all(|r| r.anomaly == AnomalyLabel::Normal));
}

/// 95 points near the origin plus 5 far away, spread deterministically.
fn contaminated_rows() -> Vec<Vec<f64>> {
    let mut rows: Vec<Vec<f64>> = (0..95)
        .map(|i| {
            let a = f64::from(i) * 0.37;
            vec![a.sin() * (1.0 + f64::from(i % 7) * 0.05), a.cos() * (1.0 + f64::from(i % 5) * 0.07)]
        })
        .collect();
    for i in 0..5 {
        let r = 12.0 + f64::from(i) * 3.0;
        rows.push(vec![r, -r * 0.5 + f64::from(i)]);
    }
    rows
}

#[test]
fn contamination_controls_the_share_of_outliers() {
    let forest = IsolationForest::try_new(100, 256, 0.05, 42).unwrap();
    let scores = forest.fit_predict(&contaminated_rows()).unwrap();
    assert_eq!(scores.len(), 100);

    let flagged = scores.iter().filter(|s| s.anomalous).count();
    assert!((3..=7).contains(&flagged), "flagged {flagged} rows");

    let far_flagged = scores[95..].iter().filter(|s| s.anomalous).count();
    assert!(far_flagged >= 3, "only {far_flagged} planted outliers flagged");
}

#[test]
fn forest_is_deterministic_for_a_seed() {
    let forest = IsolationForest::default();
    let rows = contaminated_rows();
    assert_eq!(forest.fit_predict(&rows).unwrap(), forest.fit_predict(&rows).unwrap());
}

#[test]
fn contamination_outside_range_is_rejected() {
    assert!(IsolationForest::try_new(100, 256, 0.0, 42).is_err());
    assert!(IsolationForest::try_new(100, 256, 0.75, 42).is_err());
}
