//! Résolution du sous-type d'un record
//!
//! Deux stratégies derrière la même interface:
//! - `StructuredSubtype`: l'élément `environmentalObstructionType` existe,
//!   sa valeur doit appartenir à l'ensemble accepté
//! - `KeywordFallback`: l'élément est absent, on cherche des mots-clés dans
//!   le texte du record (heuristique)

use datex::SituationRecord;
use regex::{Regex, RegexBuilder};

use crate::config::FilterConfig;

/// Stratégie ayant résolu le sous-type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Structured,
    Keyword,
}

/// Sous-type retenu pour un record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubtype {
    pub value: String,
    pub resolution: Resolution,
}

/// Une stratégie de résolution du sous-type
pub trait SubtypeStrategy: Send + Sync {
    fn resolution(&self) -> Resolution;

    /// Retourne le sous-type si le record est retenu
    fn resolve(&self, record: &SituationRecord) -> Option<String>;
}

/// Sous-type structuré, comparé à un ensemble fini
#[derive(Debug, Clone)]
pub struct StructuredSubtype {
    accepted: Vec<String>,
}

impl StructuredSubtype {
    pub fn new(accepted: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }
}

impl SubtypeStrategy for StructuredSubtype {
    fn resolution(&self) -> Resolution {
        Resolution::Structured
    }

    fn resolve(&self, record: &SituationRecord) -> Option<String> {
        let subtype = record.subtype.as_deref()?;
        self.accepted
            .iter()
            .any(|a| a == subtype)
            .then(|| subtype.to_string())
    }
}

/// Recherche de mots-clés, insensible à la casse, sur le texte brut du record
#[derive(Debug, Clone)]
pub struct KeywordFallback {
    pattern: Option<Regex>,
    label: String,
}

impl KeywordFallback {
    /// Compile les mots-clés en une seule alternative
    ///
    /// Sans mot-clé, la stratégie ne retient aucun record.
    pub fn new(keywords: &[String], label: impl Into<String>) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(k))
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&alternatives.join("|"))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self {
            pattern,
            label: label.into(),
        })
    }
}

impl SubtypeStrategy for KeywordFallback {
    fn resolution(&self) -> Resolution {
        Resolution::Keyword
    }

    fn resolve(&self, record: &SituationRecord) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        pattern
            .is_match(&record.raw)
            .then(|| self.label.clone())
    }
}

/// Choisit la stratégie selon la présence de l'élément sous-type
pub struct SubtypeResolver {
    structured: Box<dyn SubtypeStrategy>,
    fallback: Box<dyn SubtypeStrategy>,
}

impl SubtypeResolver {
    pub fn new(structured: Box<dyn SubtypeStrategy>, fallback: Box<dyn SubtypeStrategy>) -> Self {
        Self {
            structured,
            fallback,
        }
    }

    /// Construit les deux stratégies par défaut depuis la configuration
    pub fn from_config(config: &FilterConfig) -> Result<Self, regex::Error> {
        let structured = StructuredSubtype::new(config.subtypes.iter().cloned());
        let fallback = KeywordFallback::new(&config.keywords, config.keyword_subtype.clone())?;
        Ok(Self::new(Box::new(structured), Box::new(fallback)))
    }

    pub fn resolve(&self, record: &SituationRecord) -> Option<ResolvedSubtype> {
        let strategy = if record.subtype.is_some() {
            &self.structured
        } else {
            &self.fallback
        };

        strategy.resolve(record).map(|value| ResolvedSubtype {
            value,
            resolution: strategy.resolution(),
        })
    }
}

impl std::fmt::Debug for SubtypeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtypeResolver")
            .field("structured", &self.structured.resolution())
            .field("fallback", &self.fallback.resolution())
            .finish()
    }
}
