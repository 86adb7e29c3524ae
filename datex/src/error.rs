//! Types d'erreurs pour le crate datex

use thiserror::Error;

/// Erreurs fatales pouvant survenir lors de la lecture d'un flux DATEX II
///
/// Aucune de ces erreurs n'est récupérable: le document est rejeté en entier.
#[derive(Debug, Error)]
pub enum DatexError {
    /// XML mal formé
    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// Octets invalides pour l'encodage déclaré
    #[error("Invalid {encoding} content: {reason}")]
    InvalidEncoding {
        encoding: &'static str,
        reason: String,
    },

    /// Document vide (aucun élément racine)
    #[error("Empty document: no root element")]
    EmptyDocument,

    /// Fin de document avant la fermeture de tous les éléments
    #[error("Unexpected end of document: {open} element(s) left open")]
    UnexpectedEof { open: usize },
}

impl DatexError {
    /// Crée une erreur XML avec la position courante du lecteur
    pub fn xml(position: usize, source: impl Into<quick_xml::Error>) -> Self {
        Self::Xml {
            position,
            source: source.into(),
        }
    }

    /// Crée une erreur d'encodage
    pub fn invalid_encoding(encoding: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            encoding,
            reason: reason.into(),
        }
    }
}
