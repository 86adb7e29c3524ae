//! Assemblage d'une feature à partir d'un record accepté

use chrono::{DateTime, FixedOffset, SecondsFormat};
use datex::SituationRecord;
use geo::Point;
use serde::Serialize;

use crate::config::Labels;
use crate::pipeline::filter::Accepted;
use crate::pipeline::temporal::FeatureStatus;

/// Route reportée quand le record ne porte pas de `roadNumber`
pub const ROAD_PLACEHOLDER: &str = "N/A";

/// Description reportée quand le record n'a aucun commentaire français
pub const DESCRIPTION_PLACEHOLDER: &str = "Pas de description";

/// Séparateur entre commentaires
pub const COMMENT_SEPARATOR: &str = " | ";

/// Longueur maximale de la description, en caractères
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// Propriétés GeoJSON d'une feature, dans l'ordre de sortie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
    /// Identifiant de la situation parente
    pub id: String,
    pub source: String,
    pub road: String,
    /// Type du record sans préfixe
    #[serde(rename = "type")]
    pub event_type: String,
    pub subtype: String,
    pub problem: String,
    pub severity: String,
    pub description: String,
    /// Date de début, telle que lue dans le flux
    pub start_date: String,
    /// Date de fin, telle que lue dans le flux (`null` si absente)
    pub end_date: Option<String>,
    pub is_active: bool,
    pub status: FeatureStatus,
    /// Instant d'assemblage de la feature
    pub updated_at: String,
}

/// Feature ponctuelle (x = longitude, y = latitude)
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub geometry: Point<f64>,
    pub properties: FeatureProperties,
}

impl GeoFeature {
    /// Convertit en feature GeoJSON
    pub fn to_geojson(&self) -> Result<geojson::Feature, serde_json::Error> {
        let properties = match serde_json::to_value(&self.properties)? {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        };

        Ok(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties,
            foreign_members: None,
        })
    }
}

/// Construit la feature d'un record accepté
///
/// `updated_at` est l'instant d'assemblage. Il peut différer de quelques
/// microsecondes du `generated_at` du document.
pub fn assemble(
    record: &SituationRecord,
    accepted: &Accepted,
    labels: &Labels,
    updated_at: DateTime<FixedOffset>,
) -> GeoFeature {
    let properties = FeatureProperties {
        id: record.situation_id.clone().unwrap_or_default(),
        source: record.source.clone().unwrap_or_default(),
        road: record
            .road
            .clone()
            .unwrap_or_else(|| ROAD_PLACEHOLDER.to_string()),
        event_type: record.record_type().to_string(),
        subtype: accepted.subtype.clone(),
        problem: labels.problem.clone(),
        severity: record.severity.clone(),
        description: describe(&record.comments),
        start_date: record.start_time.clone().unwrap_or_default(),
        end_date: record.end_time.clone(),
        is_active: accepted.status.is_active,
        status: accepted.status.status,
        updated_at: updated_at.to_rfc3339_opts(SecondsFormat::Micros, false),
    };

    GeoFeature {
        geometry: accepted.position,
        properties,
    }
}

/// Joint les commentaires et tronque à `DESCRIPTION_MAX_CHARS` caractères
pub fn describe(comments: &[String]) -> String {
    if comments.is_empty() {
        return DESCRIPTION_PLACEHOLDER.to_string();
    }

    let joined = comments.join(COMMENT_SEPARATOR);
    match joined.char_indices().nth(DESCRIPTION_MAX_CHARS) {
        Some((end, _)) => joined[..end].to_string(),
        None => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::subtype::Resolution;
    use crate::pipeline::temporal::ClassifiedStatus;

    fn updated_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-14T10:00:00+02:00").unwrap()
    }

    fn record() -> SituationRecord {
        SituationRecord {
            situation_id: Some("DIRO-0001".to_string()),
            record_id: Some("DIRO-0001-R1".to_string()),
            severity: "high".to_string(),
            source: Some("DIR Ouest".to_string()),
            raw_type: "ns2:EnvironmentalObstruction".to_string(),
            subtype: Some("flooding".to_string()),
            comments: vec!["Chaussée inondée".to_string(), "Déviation".to_string()],
            start_time: Some("2026-10-10T08:00:00+02:00".to_string()),
            ..Default::default()
        }
    }

    fn accepted() -> Accepted {
        Accepted {
            subtype: "flooding".to_string(),
            resolution: Resolution::Structured,
            position: Point::new(-1.677793, 48.117266),
            status: ClassifiedStatus::from_active(true),
        }
    }

    #[test]
    fn test_assemble() {
        let labels = Config::from_preset("diro").unwrap().labels;
        let feature = assemble(&record(), &accepted(), &labels, updated_at());
        let p = &feature.properties;

        assert_eq!(p.id, "DIRO-0001");
        assert_eq!(p.road, ROAD_PLACEHOLDER);
        assert_eq!(p.event_type, "EnvironmentalObstruction");
        assert_eq!(p.problem, "Inondation");
        assert_eq!(p.description, "Chaussée inondée | Déviation");
        assert_eq!(p.end_date, None);
        assert_eq!(p.status, FeatureStatus::EnCours);
        assert!(p.updated_at.starts_with("2026-10-14T10:00:00"));
        assert!(p.updated_at.ends_with("+02:00"));
    }

    #[test]
    fn test_describe_placeholder() {
        assert_eq!(describe(&[]), DESCRIPTION_PLACEHOLDER);
    }

    #[test]
    fn test_describe_truncates_chars() {
        let long = vec!["é".repeat(400)];
        let description = describe(&long);
        assert_eq!(description.chars().count(), DESCRIPTION_MAX_CHARS);

        let exact = vec!["a".repeat(DESCRIPTION_MAX_CHARS)];
        assert_eq!(describe(&exact), exact[0]);
    }

    #[test]
    fn test_to_geojson_lon_lat() {
        let labels = Config::from_preset("diro").unwrap().labels;
        let feature = assemble(&record(), &accepted(), &labels, updated_at())
            .to_geojson()
            .unwrap();
        let json = serde_json::to_value(&feature).unwrap();

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["geometry"]["coordinates"][0], -1.677793);
        assert_eq!(json["geometry"]["coordinates"][1], 48.117266);
        assert_eq!(json["properties"]["type"], "EnvironmentalObstruction");
        assert_eq!(json["properties"]["status"], "en_cours");
        assert!(json["properties"]["end_date"].is_null());

        let keys: Vec<&str> = json["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys[0], "id");
        assert_eq!(keys[keys.len() - 1], "updated_at");
    }
}
