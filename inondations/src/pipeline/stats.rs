//! Compteurs d'une exécution
//!
//! Les compteurs ne font que croître. Chaque record incrémente au plus une
//! fois le compteur de chaque étape atteinte.

use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::Stage;
use super::temporal::ClassifiedStatus;

/// Statistiques d'une exécution, sérialisées dans `metadata.statistics`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Situations lues dans le flux
    pub total_situations: usize,

    /// Records de l'autorité configurée
    #[serde(rename = "dir_ouest")]
    pub authority_matched: usize,

    /// Records dont le type contient le marqueur d'événement
    #[serde(rename = "environmental_obstruction")]
    pub event_type_matched: usize,

    /// Records retenus par sous-type (ou mots-clés) avec une date de début valide
    #[serde(rename = "inondations")]
    pub floods: usize,

    /// Parmi `floods`, records en cours
    #[serde(rename = "actives")]
    pub active: usize,

    /// Parmi `floods`, records terminés
    #[serde(rename = "terminees")]
    pub finished: usize,

    #[serde(rename = "par_severite")]
    pub by_severity: BTreeMap<String, usize>,

    #[serde(rename = "par_subtype")]
    pub by_subtype: BTreeMap<String, usize>,

    /// Records rejetés faute de coordonnées exploitables
    #[serde(rename = "sans_coords")]
    pub without_coords: usize,

    /// Records rejetés faute de date de début exploitable
    #[serde(skip)]
    pub without_start: usize,

    /// Rejets par étape
    #[serde(skip)]
    pub rejected: BTreeMap<Stage, usize>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre une situation lue
    pub fn record_situation(&mut self) {
        self.total_situations += 1;
    }

    /// Enregistre le passage d'une étape
    pub fn record_passed(&mut self, stage: Stage) {
        match stage {
            Stage::Authority => self.authority_matched += 1,
            Stage::EventType => self.event_type_matched += 1,
            Stage::StartTime => self.floods += 1,
            Stage::Subtype | Stage::Geometry => {}
        }
    }

    /// Enregistre un rejet à une étape
    pub fn record_rejected(&mut self, stage: Stage) {
        *self.rejected.entry(stage).or_default() += 1;
        match stage {
            Stage::StartTime => self.without_start += 1,
            Stage::Geometry => self.without_coords += 1,
            _ => {}
        }
    }

    /// Enregistre le statut d'un record classé
    pub fn record_status(&mut self, status: &ClassifiedStatus) {
        if status.is_active {
            self.active += 1;
        } else {
            self.finished += 1;
        }
    }

    /// Enregistre une feature acceptée
    pub fn record_accepted(&mut self, severity: &str, subtype: &str) {
        *self.by_severity.entry(severity.to_string()).or_default() += 1;
        *self.by_subtype.entry(subtype.to_string()).or_default() += 1;
    }

    /// Nombre de features produites
    pub fn accepted(&self) -> usize {
        self.by_severity.values().sum()
    }

    /// Rejets enregistrés à une étape
    pub fn rejected_at(&self, stage: Stage) -> usize {
        self.rejected.get(&stage).copied().unwrap_or(0)
    }

    /// Résumé sur une ligne
    pub fn summary(&self) -> String {
        format!(
            "{} situations, {} floods ({} active, {} finished), {} without coordinates",
            self.total_situations, self.floods, self.active, self.finished, self.without_coords
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_counters() {
        let mut stats = RunStatistics::new();
        stats.record_passed(Stage::Authority);
        stats.record_passed(Stage::Authority);
        stats.record_passed(Stage::EventType);
        stats.record_passed(Stage::Subtype);
        stats.record_passed(Stage::StartTime);

        assert_eq!(stats.authority_matched, 2);
        assert_eq!(stats.event_type_matched, 1);
        assert_eq!(stats.floods, 1);
    }

    #[test]
    fn test_rejections() {
        let mut stats = RunStatistics::new();
        stats.record_rejected(Stage::Authority);
        stats.record_rejected(Stage::Geometry);
        stats.record_rejected(Stage::StartTime);

        assert_eq!(stats.without_coords, 1);
        assert_eq!(stats.without_start, 1);
        assert_eq!(stats.rejected_at(Stage::Authority), 1);
        assert_eq!(stats.rejected_at(Stage::EventType), 0);
    }

    #[test]
    fn test_status_and_accepted() {
        let mut stats = RunStatistics::new();
        stats.record_status(&ClassifiedStatus::from_active(true));
        stats.record_status(&ClassifiedStatus::from_active(false));
        stats.record_accepted("high", "flooding");
        stats.record_accepted("high", "flashFloods");

        assert_eq!(stats.active, 1);
        assert_eq!(stats.finished, 1);
        assert_eq!(stats.by_severity.get("high"), Some(&2));
        assert_eq!(stats.by_subtype.get("flooding"), Some(&1));
        assert_eq!(stats.accepted(), 2);
    }

    #[test]
    fn test_serialized_keys() {
        let mut stats = RunStatistics::new();
        stats.record_situation();
        stats.record_rejected(Stage::StartTime);

        let value = serde_json::to_value(&stats).unwrap();
        let object = value.as_object().unwrap();
        let keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();

        assert_eq!(
            keys,
            vec![
                "total_situations",
                "dir_ouest",
                "environmental_obstruction",
                "inondations",
                "actives",
                "terminees",
                "par_severite",
                "par_subtype",
                "sans_coords",
            ]
        );
        assert_eq!(object["total_situations"], 1);
    }

    #[test]
    fn test_summary() {
        let mut stats = RunStatistics::new();
        stats.total_situations = 12;
        stats.floods = 3;
        assert!(stats.summary().contains("12 situations"));
        assert!(stats.summary().contains("3 floods"));
    }
}
