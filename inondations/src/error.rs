//! Erreurs fatales d'une exécution
//!
//! Les rejets par record ne sont pas des erreurs: ils sont comptés dans
//! `RunStatistics` (voir `pipeline::filter::Stage`).

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Erreur qui interrompt l'exécution avant toute écriture
#[derive(Debug, Error)]
pub enum RunError {
    /// Récupération du flux impossible
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Flux illisible (encodage ou XML)
    #[error("Feed parse failed: {0}")]
    Parse(#[from] datex::DatexError),

    /// Configuration inutilisable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Sérialisation du document impossible
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Destination non inscriptible
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Crée une erreur d'écriture avec le chemin concerné
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
