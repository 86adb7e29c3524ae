//! Types de données pour le crate datex

/// Sévérité appliquée quand la situation ne porte pas d'`overallSeverity`
pub const DEFAULT_SEVERITY: &str = "medium";

/// Namespace DATEX II 2.0 (payload)
pub const DATEX2_NAMESPACE: &str = "http://datex2.eu/schema/2/2_0";

/// Namespace XML Schema Instance (attribut `xsi:type`)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Namespaces utilisés pour reconnaître les éléments du flux
///
/// La correspondance se fait sur l'URI résolue, jamais sur le préfixe:
/// un flux qui passe de `ns2:` à `d2:` reste lisible sans modification.
/// Un namespace `payload` vide correspond aux éléments non qualifiés.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    /// URI du schéma DATEX II
    pub payload: String,

    /// URI XML Schema Instance
    pub xsi: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            payload: DATEX2_NAMESPACE.to_string(),
            xsi: XSI_NAMESPACE.to_string(),
        }
    }
}

/// Une situation DATEX II et ses records
#[derive(Debug, Clone, Default)]
pub struct Situation {
    /// Attribut `id` de la situation
    pub id: Option<String>,

    /// Premier `overallSeverity` trouvé dans la situation
    pub severity: Option<String>,

    /// Records dans l'ordre du document
    pub records: Vec<SituationRecord>,
}

/// Un situation record normalisé (candidat au filtrage)
///
/// Chaque champ optionnel vaut `None` (ou un vecteur vide) quand l'élément
/// est absent du record. Seule la sévérité reçoit une valeur par défaut.
#[derive(Debug, Clone, Default)]
pub struct SituationRecord {
    /// Identifiant de la situation parente (partagé par ses records)
    pub situation_id: Option<String>,

    /// Attribut `id` du record
    pub record_id: Option<String>,

    /// Sévérité héritée de la situation
    pub severity: String,

    /// Texte du premier `sourceIdentification`
    pub source: Option<String>,

    /// Attribut `xsi:type` brut (ex: `ns2:EnvironmentalObstruction`)
    pub raw_type: String,

    /// Premier `environmentalObstructionType`
    pub subtype: Option<String>,

    /// Textes des éléments `latitude`, ordre du document
    pub latitudes: Vec<String>,

    /// Textes des éléments `longitude`, ordre du document
    pub longitudes: Vec<String>,

    /// Commentaires publics en français (valeurs vides ignorées)
    pub comments: Vec<String>,

    /// Premier `roadNumber`
    pub road: Option<String>,

    /// Premier `overallStartTime`
    pub start_time: Option<String>,

    /// Premier `overallEndTime`
    pub end_time: Option<String>,

    /// Texte source du record, balises comprises
    pub raw: String,
}

impl SituationRecord {
    /// Type du record sans préfixe de namespace (`EnvironmentalObstruction`)
    pub fn record_type(&self) -> &str {
        match self.raw_type.rfind(':') {
            Some(pos) => &self.raw_type[pos + 1..],
            None => &self.raw_type,
        }
    }

    /// Première paire (latitude, longitude) brute, si les deux existent
    pub fn first_position(&self) -> Option<(&str, &str)> {
        let lat = self.latitudes.first()?;
        let lon = self.longitudes.first()?;
        Some((lat.as_str(), lon.as_str()))
    }
}
