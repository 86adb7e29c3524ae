//! Configuration du système

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Nom du preset embarqué par défaut
pub const DEFAULT_PRESET: &str = "diro";

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// URL du flux DATEX II
    pub feed_url: String,

    /// Timeout de la requête HTTP (secondes)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Namespaces XML du flux
    #[serde(default)]
    pub namespaces: NamespaceConfig,

    /// Paramètres de la chaîne de filtres
    pub filter: FilterConfig,

    /// Fichiers de sortie
    pub output: OutputConfig,

    /// Libellés reportés dans les sorties
    pub labels: Labels,
}

/// URIs des namespaces reconnus dans le flux
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamespaceConfig {
    /// Namespace du schéma DATEX II
    #[serde(default = "default_payload_ns")]
    pub payload: String,

    /// Namespace XML Schema Instance
    #[serde(default = "default_xsi_ns")]
    pub xsi: String,
}

/// Paramètres des filtres
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Nom de l'autorité et ses abréviations (sous-chaînes, sensibles à la casse)
    pub authorities: Vec<String>,

    /// Marqueur recherché dans l'attribut `xsi:type` brut
    pub event_marker: String,

    /// Sous-types acceptés quand l'élément est présent
    pub subtypes: Vec<String>,

    /// Mots-clés (insensibles à la casse) quand le sous-type est absent
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Sous-type attribué aux records retenus par mots-clés
    #[serde(default = "default_keyword_subtype")]
    pub keyword_subtype: String,
}

/// Chemins des fichiers produits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub geojson: PathBuf,
    pub stats: PathBuf,
}

/// Libellés des sorties
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Labels {
    /// Titre du rapport texte
    pub title: String,
    /// Source de données (`metadata.source`)
    pub source: String,
    /// Description du filtre (`metadata.filter`)
    pub filter: String,
    /// Zone couverte
    pub zone: String,
    /// Nom court de l'autorité
    pub authority: String,
    /// Problème reporté dans chaque feature (`properties.problem`)
    pub problem: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_payload_ns() -> String {
    datex::types::DATEX2_NAMESPACE.to_string()
}

fn default_xsi_ns() -> String {
    datex::types::XSI_NAMESPACE.to_string()
}

fn default_keyword_subtype() -> String {
    "flooding-detected-by-keywords".to_string()
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            payload: default_payload_ns(),
            xsi: default_xsi_ns(),
        }
    }
}

impl NamespaceConfig {
    /// Convertit vers les namespaces du lecteur DATEX II
    pub fn to_datex(&self) -> datex::Namespaces {
        datex::Namespaces {
            payload: self.payload.clone(),
            xsi: self.xsi.clone(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "diro" => Self::load_embedded(include_str!("presets/diro.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: diro", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn resolve(preset_or_path: &str) -> Result<Self> {
        match preset_or_path {
            "diro" => Self::from_preset(preset_or_path),
            _ => Self::load(Path::new(preset_or_path)),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Applique les variables d'environnement (`DATEX_URL`, `DATEX_TIMEOUT`)
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATEX_URL") {
            if !url.trim().is_empty() {
                self.feed_url = url;
            }
        }
        if let Some(timeout) = std::env::var("DATEX_TIMEOUT")
            .ok()
            .and_then(|t| t.parse().ok())
        {
            self.timeout_secs = timeout;
        }
    }

    /// Applique les valeurs passées en ligne de commande
    pub fn apply_overrides(
        &mut self,
        url: Option<String>,
        timeout_secs: Option<u64>,
        geojson: Option<PathBuf>,
        stats: Option<PathBuf>,
    ) {
        if let Some(url) = url {
            self.feed_url = url;
        }
        if let Some(timeout) = timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(path) = geojson {
            self.output.geojson = path;
        }
        if let Some(path) = stats {
            self.output.stats = path;
        }
    }

    /// Vérifie la cohérence de la configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than 0");
        }
        if self.filter.authorities.iter().all(|a| a.is_empty()) {
            anyhow::bail!("filter.authorities must contain at least one non-empty name");
        }
        if self.filter.event_marker.is_empty() {
            anyhow::bail!("filter.event_marker must not be empty");
        }
        if self.filter.subtypes.is_empty() && self.filter.keywords.is_empty() {
            anyhow::bail!("filter.subtypes and filter.keywords cannot both be empty");
        }
        Ok(())
    }

    /// Timeout de la requête HTTP
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_preset() {
        let config = Config::from_preset("diro").unwrap();
        assert!(config.feed_url.starts_with("https://"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.filter.authorities, vec!["DIR Ouest", "DIRO"]);
        assert_eq!(config.filter.subtypes, vec!["flooding", "flashFloods"]);
        assert_eq!(config.filter.keyword_subtype, "flooding-detected-by-keywords");
        assert_eq!(config.namespaces.payload, datex::types::DATEX2_NAMESPACE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Config::from_preset("dir-est").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::from_preset("diro").unwrap();
        config.apply_overrides(
            Some("http://localhost/feed.xml".to_string()),
            Some(5),
            Some(PathBuf::from("out/a.geojson")),
            None,
        );

        assert_eq!(config.feed_url, "http://localhost/feed.xml");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.output.geojson, PathBuf::from("out/a.geojson"));
        assert_eq!(
            config.output.stats,
            PathBuf::from("data/inondations-diro-stats.txt")
        );
    }

    #[test]
    fn test_defaults_when_omitted() {
        let json = r#"{
            "feed_url": "http://example.org/content.xml",
            "filter": {
                "authorities": ["DIR Est"],
                "event_marker": "EnvironmentalObstruction",
                "subtypes": ["flooding"]
            },
            "output": { "geojson": "a.geojson", "stats": "a.txt" },
            "labels": {
                "title": "T", "source": "S", "filter": "F",
                "zone": "Z", "authority": "DIR Est", "problem": "Inondation"
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.namespaces.xsi, datex::types::XSI_NAMESPACE);
        assert!(config.filter.keywords.is_empty());
        assert_eq!(config.filter.keyword_subtype, "flooding-detected-by-keywords");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_invalid() {
        let mut config = Config::from_preset("diro").unwrap();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::from_preset("diro").unwrap();
        config.filter.authorities = vec![String::new()];
        assert!(config.validate().is_err());

        let mut config = Config::from_preset("diro").unwrap();
        config.filter.subtypes.clear();
        config.filter.keywords.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("inondations-missing-config.json");
        assert!(Config::load(&path).is_err());
    }
}
