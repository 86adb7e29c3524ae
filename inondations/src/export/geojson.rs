//! Document de sortie GeoJSON (FeatureCollection + metadata)

use std::path::Path;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use geojson::{FeatureCollection, JsonObject};
use serde_json::json;

use super::feature::GeoFeature;
use super::{stage, StagedFile};
use crate::config::Labels;
use crate::error::RunError;
use crate::pipeline::stats::RunStatistics;

/// Construit la FeatureCollection avec son bloc `metadata`
///
/// Les features gardent l'ordre d'acceptation.
pub fn build_document(
    features: &[GeoFeature],
    stats: &RunStatistics,
    labels: &Labels,
    generated_at: DateTime<FixedOffset>,
) -> Result<FeatureCollection, RunError> {
    let features = features
        .iter()
        .map(GeoFeature::to_geojson)
        .collect::<Result<Vec<_>, _>>()?;

    let metadata = json!({
        "generated_at": generated_at.to_rfc3339_opts(SecondsFormat::Micros, false),
        "source": labels.source,
        "filter": labels.filter,
        "count": features.len(),
        "count_active": stats.active,
        "count_finished": stats.finished,
        "statistics": serde_json::to_value(stats)?,
    });

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("metadata".to_string(), metadata);

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    })
}

/// Sérialise le document en JSON indenté (caractères non ASCII conservés)
pub fn render_document(collection: &FeatureCollection) -> Result<String, RunError> {
    let mut json = serde_json::to_string_pretty(collection)?;
    json.push('\n');
    Ok(json)
}

/// Prépare l'écriture du document, renommé au `commit`
pub fn stage_document(collection: &FeatureCollection, path: &Path) -> Result<StagedFile, RunError> {
    let json = render_document(collection)?;
    stage(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::export::feature::FeatureProperties;
    use crate::pipeline::temporal::FeatureStatus;
    use geo::Point;

    fn generated_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-14T10:00:00.123456+02:00").unwrap()
    }

    fn feature(id: &str) -> GeoFeature {
        GeoFeature {
            geometry: Point::new(-1.55, 47.21),
            properties: FeatureProperties {
                id: id.to_string(),
                source: "DIR Ouest".to_string(),
                road: "N165".to_string(),
                event_type: "EnvironmentalObstruction".to_string(),
                subtype: "flooding".to_string(),
                problem: "Inondation".to_string(),
                severity: "high".to_string(),
                description: "Chaussée inondée".to_string(),
                start_date: "2026-10-13T22:10:00+02:00".to_string(),
                end_date: None,
                is_active: true,
                status: FeatureStatus::EnCours,
                updated_at: "2026-10-14T10:00:00.123456+02:00".to_string(),
            },
        }
    }

    fn stats() -> RunStatistics {
        let mut stats = RunStatistics::new();
        stats.total_situations = 5;
        stats.floods = 3;
        stats.active = 2;
        stats.finished = 1;
        stats.record_accepted("high", "flooding");
        stats.record_accepted("high", "flooding");
        stats
    }

    #[test]
    fn test_build_document_metadata() {
        let labels = Config::from_preset("diro").unwrap().labels;
        let doc = build_document(&[feature("A"), feature("B")], &stats(), &labels, generated_at())
            .unwrap();
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"].as_array().unwrap().len(), 2);
        assert_eq!(json["features"][0]["properties"]["id"], "A");
        assert_eq!(json["features"][1]["properties"]["id"], "B");

        let metadata = &json["metadata"];
        assert_eq!(metadata["generated_at"], "2026-10-14T10:00:00.123456+02:00");
        assert_eq!(metadata["source"], "DATEX II - Bison Futé");
        assert_eq!(metadata["count"], 2);
        assert_eq!(metadata["count_active"], 2);
        assert_eq!(metadata["count_finished"], 1);
        assert_eq!(metadata["statistics"]["inondations"], 3);
        assert_eq!(metadata["statistics"]["par_severite"]["high"], 2);
    }

    #[test]
    fn test_render_keeps_non_ascii() {
        let labels = Config::from_preset("diro").unwrap().labels;
        let doc = build_document(&[feature("A")], &stats(), &labels, generated_at()).unwrap();
        let json = render_document(&doc).unwrap();

        assert!(json.contains("Chaussée inondée"));
        assert!(json.contains("Bison Futé"));
        assert!(json.contains("\n  \""));
    }

    #[test]
    fn test_stage_document() {
        let labels = Config::from_preset("diro").unwrap().labels;
        let doc = build_document(&[], &RunStatistics::new(), &labels, generated_at()).unwrap();

        let output_path = std::env::temp_dir().join("inondations_test.geojson");
        stage_document(&doc, &output_path).unwrap().commit().unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["metadata"]["count"], 0);
        assert!(parsed["features"].as_array().unwrap().is_empty());

        std::fs::remove_file(output_path).ok();
    }
}
