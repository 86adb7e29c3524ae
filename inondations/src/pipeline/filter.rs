//! Chaîne de filtres appliquée à chaque record
//!
//! Les étapes sont ordonnées et s'arrêtent au premier rejet. Chaque étape
//! atteinte par un record est comptée une seule fois dans
//! [`RunStatistics`].

use chrono::{DateTime, FixedOffset};
use datex::SituationRecord;
use geo::Point;

use super::stats::RunStatistics;
use super::subtype::{Resolution, SubtypeResolver};
use super::temporal::{classify, parse_timestamp, ClassifiedStatus};
use crate::config::FilterConfig;
use crate::error::RunError;

/// Étape de la chaîne, dans l'ordre d'application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Source de l'autorité configurée
    Authority,
    /// Marqueur dans le type brut
    EventType,
    /// Sous-type structuré ou mots-clés
    Subtype,
    /// Date de début exploitable
    StartTime,
    /// Coordonnées exploitables
    Geometry,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Authority => "authority",
            Self::EventType => "event type",
            Self::Subtype => "subtype",
            Self::StartTime => "start time",
            Self::Geometry => "geometry",
        }
    }
}

/// Record accepté par toutes les étapes
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub subtype: String,
    pub resolution: Resolution,
    /// x = longitude, y = latitude
    pub position: Point<f64>,
    pub status: ClassifiedStatus,
}

/// Résultat du filtrage d'un record
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Accepted(Accepted),
    Rejected(Stage),
}

impl FilterOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Chaîne de filtres construite depuis la configuration
#[derive(Debug)]
pub struct FilterChain {
    authorities: Vec<String>,
    event_marker: String,
    subtypes: SubtypeResolver,
}

impl FilterChain {
    pub fn new(config: &FilterConfig) -> Result<Self, RunError> {
        let subtypes = SubtypeResolver::from_config(config)
            .map_err(|e| RunError::Config(format!("invalid keyword pattern: {}", e)))?;

        Ok(Self {
            authorities: config
                .authorities
                .iter()
                .filter(|a| !a.is_empty())
                .cloned()
                .collect(),
            event_marker: config.event_marker.clone(),
            subtypes,
        })
    }

    /// Filtre un record et met à jour les compteurs
    pub fn apply(
        &self,
        record: &SituationRecord,
        now: &DateTime<FixedOffset>,
        stats: &mut RunStatistics,
    ) -> FilterOutcome {
        match self.run_stages(record, now, stats) {
            Ok(accepted) => FilterOutcome::Accepted(accepted),
            Err(stage) => {
                stats.record_rejected(stage);
                FilterOutcome::Rejected(stage)
            }
        }
    }

    fn run_stages(
        &self,
        record: &SituationRecord,
        now: &DateTime<FixedOffset>,
        stats: &mut RunStatistics,
    ) -> Result<Accepted, Stage> {
        if !self.matches_authority(record) {
            return Err(Stage::Authority);
        }
        stats.record_passed(Stage::Authority);

        if !record.raw_type.contains(self.event_marker.as_str()) {
            return Err(Stage::EventType);
        }
        stats.record_passed(Stage::EventType);

        let resolved = self.subtypes.resolve(record).ok_or(Stage::Subtype)?;
        stats.record_passed(Stage::Subtype);

        record
            .start_time
            .as_deref()
            .and_then(|raw| parse_timestamp(raw, now.offset()))
            .ok_or(Stage::StartTime)?;
        stats.record_passed(Stage::StartTime);

        let status = classify(record.end_time.as_deref(), now);
        stats.record_status(&status);

        let position = record
            .first_position()
            .and_then(|(lat, lon)| parse_position(lat, lon))
            .ok_or(Stage::Geometry)?;
        stats.record_passed(Stage::Geometry);

        Ok(Accepted {
            subtype: resolved.value,
            resolution: resolved.resolution,
            position,
            status,
        })
    }

    fn matches_authority(&self, record: &SituationRecord) -> bool {
        record.source.as_deref().is_some_and(|source| {
            self.authorities
                .iter()
                .any(|authority| source.contains(authority.as_str()))
        })
    }
}

/// Construit le point (lon, lat), rejeté si une composante n'est pas finie
pub fn parse_position(lat: &str, lon: &str) -> Option<Point<f64>> {
    let lat: f64 = fast_float::parse(lat.trim()).ok()?;
    let lon: f64 = fast_float::parse(lon.trim()).ok()?;

    (lat.is_finite() && lon.is_finite()).then(|| Point::new(lon, lat))
}
