//! # datex
//!
//! Lecture des flux DATEX II (publications d'événements routiers).
//!
//! ## Features
//!
//! - Détection d'encodage (BOM, déclaration XML) avec `encoding_rs`, validation SIMD avec `simdutf8`
//! - Parcours paresseux des `situation` avec `quick-xml`
//! - Éléments reconnus par URI de namespace, indépendamment du préfixe
//! - Champs optionnels explicites: un élément absent donne `None`, jamais une erreur
//!
//! ## Usage
//!
//! ```rust,ignore
//! use datex::{parse, Namespaces};
//!
//! let xml = std::fs::read("content.xml")?;
//! for situation in parse(&xml, &Namespaces::default())? {
//!     for record in &situation.records {
//!         println!("{} {:?}", record.record_type(), record.source);
//!     }
//! }
//! ```

pub mod encoding;
pub mod error;
pub mod reader;
pub mod types;

pub use encoding::decode;
pub use error::DatexError;
pub use reader::SituationReader;
pub use types::{Namespaces, Situation, SituationRecord, DEFAULT_SEVERITY};

/// Parse un flux DATEX II complet et retourne toutes ses situations.
///
/// # Errors
///
/// Retourne `DatexError` si le flux ne peut pas être décodé ou si le XML
/// est mal formé. Il n'y a pas de récupération partielle.
pub fn parse(data: &[u8], namespaces: &Namespaces) -> Result<Vec<Situation>, DatexError> {
    let text = decode(data)?;
    SituationReader::new(&text, namespaces).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latin1_feed() {
        let mut data = br#"<?xml version="1.0" encoding="ISO-8859-1"?>
<d2:d2LogicalModel xmlns:d2="http://datex2.eu/schema/2/2_0">
<d2:situation id="S"><d2:situationRecord id="R">
<d2:generalPublicComment><d2:comment><d2:values><d2:value lang="fr">Mont"#
            .to_vec();
        data.push(0xE9); // é
        data.extend_from_slice(
            b"e des eaux</d2:value></d2:values></d2:comment></d2:generalPublicComment>
</d2:situationRecord></d2:situation></d2:d2LogicalModel>",
        );

        let situations = parse(&data, &Namespaces::default()).unwrap();
        assert_eq!(situations.len(), 1);
        assert_eq!(situations[0].records[0].comments, vec!["Montée des eaux"]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse(b"not xml at all <<<", &Namespaces::default()).is_err());
    }
}
