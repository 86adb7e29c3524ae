//! Classification temporelle: en cours ou terminée
//!
//! L'instant de référence est capturé une seule fois par exécution et
//! transmis explicitement, via `Clock`.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use serde::Serialize;

/// Statut d'une feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    /// Pas de date de fin, ou date de fin non atteinte
    EnCours,
    /// Date de fin passée
    Terminee,
}

impl FeatureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnCours => "en_cours",
            Self::Terminee => "terminee",
        }
    }
}

/// Statut dérivé de (date de fin, maintenant)
///
/// Invariant: `is_active == (status == EnCours)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedStatus {
    pub is_active: bool,
    pub status: FeatureStatus,
}

impl ClassifiedStatus {
    pub fn from_active(is_active: bool) -> Self {
        Self {
            is_active,
            status: if is_active {
                FeatureStatus::EnCours
            } else {
                FeatureStatus::Terminee
            },
        }
    }
}

/// Source de l'heure courante
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Horloge système, fuseau local
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().into()
    }
}

/// Horloge figée (tests, rejeu d'un instantané)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Parse un horodatage DATEX II
///
/// Accepte tout décalage RFC 3339 (`+02:00`, `-05:00`, `Z`), les décalages
/// sans deux-points (`+0200`), et les horodatages sans décalage, lus dans
/// `offset` (celui de l'instant de référence).
pub fn parse_timestamp(raw: &str, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt);
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    offset.from_local_datetime(&naive).single()
}

/// Classe un record selon sa date de fin
///
/// Fin absente ou illisible: en cours. Fin égale à `now`: en cours.
pub fn classify(end: Option<&str>, now: &DateTime<FixedOffset>) -> ClassifiedStatus {
    let is_active = match end.and_then(|raw| parse_timestamp(raw, now.offset())) {
        Some(end) => *now <= end,
        None => true,
    };
    ClassifiedStatus::from_active(is_active)
}
