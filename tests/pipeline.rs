//! Fixture CSV through loader, summary, aggregates and charts.

use claims_dashboard::aggregate;
use claims_dashboard::charts::{self, ChartKind, FIGURE_HEIGHT, FIGURE_WIDTH};
use claims_dashboard::error::{LoadError, SummaryError};
use claims_dashboard::loader;
use claims_dashboard::summary;
use claims_dashboard::types::ClaimRecord;
use std::io::Write;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/claims.csv")
}

fn fixture() -> Vec<ClaimRecord> {
    loader::load_claims(fixture_path()).expect("fixture loads").0
}

fn png_dimensions(png: &[u8]) -> (u32, u32) {
    let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    (width, height)
}

#[test]
fn fixture_loads_with_extra_columns() {
    let (records, report) = loader::load_claims(fixture_path()).unwrap();
    assert_eq!(records.len(), 10);
    assert_eq!(report.total_rows, 10);
    assert_eq!(report.fraud_rows, 4);
    assert_eq!(report.first_incident.unwrap().to_string(), "2015-01-01");
    assert_eq!(report.last_incident.unwrap().to_string(), "2015-01-05");
}

#[test]
fn cards_match_fixture() {
    let records = fixture();
    let cards = summary::card_data(&records).unwrap();
    assert_eq!(cards.percent_fraud, "40.0%");
    assert_eq!(cards.fraud_loss, "US$ 100,000");
    assert_eq!(cards.average_claim, "US$ 5,500.0");
}

#[test]
fn aggregates_match_fixture() {
    let records = fixture();

    let cities: Vec<(String, usize)> = aggregate::fraud_by_city(&records)
        .into_iter()
        .map(|c| (c.category, c.count))
        .collect();
    assert_eq!(
        cities,
        vec![
            ("Columbus".to_string(), 2),
            ("Arlington".to_string(), 1),
            ("Springfield".to_string(), 1),
            ("Hillsdale".to_string(), 0),
            ("Riverwood".to_string(), 0),
        ]
    );

    let daily: Vec<usize> = aggregate::daily_counts(&records)
        .iter()
        .map(|d| d.count)
        .collect();
    assert_eq!(daily, vec![2, 2, 2, 2, 4]);

    let ages = aggregate::fraud_by_age_group(&records);
    assert_eq!(ages.len(), 9);
    assert_eq!(ages.iter().map(|a| a.count).sum::<usize>(), 4);

    let hours = aggregate::claims_by_hour(&records);
    let five = hours.iter().find(|h| h.category == "5").unwrap();
    assert_eq!((five.fraud, five.not_fraud), (1, 1));
}

#[test]
fn every_chart_is_a_full_size_png() {
    let records = fixture();
    let set = charts::render_all(&records).unwrap();
    assert_eq!(set.len(), 8);
    for (artifact, kind) in set.iter().zip(ChartKind::ALL) {
        assert_eq!(artifact.kind, kind);
        assert!(artifact.png.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(png_dimensions(&artifact.png), (FIGURE_WIDTH, FIGURE_HEIGHT));
        assert!(!artifact.base64.is_empty());
    }
    let city = set.get(ChartKind::IncidentCity).unwrap();
    assert_eq!(city.kind.slug(), "plot_incident_city");
}

#[test]
fn all_legit_dataset_has_no_fraud_cards() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let text = std::fs::read_to_string(fixture_path()).unwrap().replace(",Y\n", ",N\n");
    file.write_all(text.as_bytes()).unwrap();

    let (records, report) = loader::load_claims(file.path()).unwrap();
    assert_eq!(report.fraud_rows, 0);
    assert_eq!(summary::card_data(&records), Err(SummaryError::NoFraudRows));
    assert_eq!(
        summary::average_claim(&records).unwrap(),
        summary::average_claim(&fixture()).unwrap()
    );
}

#[test]
fn unknown_flag_is_rejected_with_its_line() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let text = std::fs::read_to_string(fixture_path())
        .unwrap()
        .replacen(",Y\n", ",maybe\n", 1);
    file.write_all(text.as_bytes()).unwrap();

    match loader::load_claims(file.path()) {
        Err(LoadError::InvalidValue { line, column, value, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(column, "fraud_reported");
            assert_eq!(value, "maybe");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn blank_police_report_cell_keeps_the_row() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let text = std::fs::read_to_string(fixture_path())
        .unwrap()
        .replacen(",Columbus,5,YES,", ",Columbus,5,,", 1);
    file.write_all(text.as_bytes()).unwrap();

    let (records, report) = loader::load_claims(file.path()).unwrap();
    assert_eq!(report.total_rows, 10);
    assert_eq!(records[0].police_report_available, None);

    let cards = summary::card_data(&records).unwrap();
    assert_eq!(cards.percent_fraud, "40.0%");
    assert_eq!(cards.fraud_loss, "US$ 100,000");

    let police_rows: usize = aggregate::police_report_split(&records)
        .iter()
        .map(|s| s.fraud + s.not_fraud)
        .sum();
    assert_eq!(police_rows, 9);
    assert_eq!(charts::render_all(&records).unwrap().len(), 8);
}
