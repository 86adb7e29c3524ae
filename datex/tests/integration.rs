//! Tests d'intégration sur des extraits de flux DATEX II

use std::path::Path;

use datex::{Namespaces, SituationReader};

fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("Cannot read {}: {}", path.display(), e))
}

#[test]
fn test_parse_sample_feed() {
    let data = fixture("diro-sample.xml");
    let situations = datex::parse(&data, &Namespaces::default()).unwrap();

    assert_eq!(situations.len(), 8);

    let records: usize = situations.iter().map(|s| s.records.len()).sum();
    assert_eq!(records, 9);

    // Tous les records portent l'identifiant de leur situation
    for situation in &situations {
        for record in &situation.records {
            assert_eq!(record.situation_id, situation.id);
            assert!(!record.raw.is_empty());
        }
    }

    let works = &situations[4];
    assert_eq!(works.id.as_deref(), Some("DIRO-0004"));
    assert_eq!(works.records[0].record_type(), "MaintenanceWorks");
    assert_eq!(works.records[1].subtype.as_deref(), Some("fallenTrees"));
    assert_eq!(works.records[1].severity, "low");
}

#[test]
fn test_optional_fields_absent() {
    let data = fixture("diro-sample.xml");
    let situations = datex::parse(&data, &Namespaces::default()).unwrap();

    let keyword_only = &situations[2].records[0];
    assert_eq!(keyword_only.severity, datex::DEFAULT_SEVERITY);
    assert!(keyword_only.subtype.is_none());
    assert!(keyword_only.road.is_none());
    assert!(keyword_only.raw.contains("inondation"));

    let no_coords = &situations[5].records[0];
    assert!(no_coords.first_position().is_none());
    assert!(no_coords.end_time.is_none());
}

#[test]
fn test_multiple_comments_in_order() {
    let data = fixture("diro-sample.xml");
    let situations = datex::parse(&data, &Namespaces::default()).unwrap();

    assert_eq!(
        situations[1].records[0].comments,
        vec!["Crue soudaine", "Circulation interrompue"]
    );
}

#[test]
fn test_all_fixtures_parse() {
    let pattern = format!("{}/tests/fixtures/*.xml", env!("CARGO_MANIFEST_DIR"));
    let mut count = 0;

    for entry in glob::glob(&pattern).unwrap() {
        let path = entry.unwrap();
        let data = std::fs::read(&path).unwrap();
        let text = datex::decode(&data).unwrap();

        let parsed: Result<Vec<_>, _> =
            SituationReader::new(&text, &Namespaces::default()).collect();
        assert!(parsed.is_ok(), "Failed to parse {}", path.display());
        count += 1;
    }

    assert!(count > 0, "Should find at least one fixture");
}

#[test]
fn test_truncated_feed_is_fatal() {
    let data = fixture("diro-sample.xml");
    let truncated = &data[..data.len() / 2];

    assert!(datex::parse(truncated, &Namespaces::default()).is_err());
}
