//! Détection de l'encodage et décodage du flux en UTF-8

use std::borrow::Cow;

use encoding_rs::Encoding;
use memchr::memmem;
use tracing::{debug, warn};

use crate::DatexError;

/// Taille maximale du prologue inspecté pour trouver la déclaration XML
const PROLOG_LIMIT: usize = 1024;

/// Décode un flux XML en UTF-8
///
/// Ordre de détection: BOM, puis attribut `encoding` de la déclaration XML,
/// puis UTF-8 par défaut. Le contenu UTF-8 est validé sans copie.
pub fn decode(data: &[u8]) -> Result<Cow<'_, str>, DatexError> {
    // Le BOM l'emporte sur la déclaration
    let (data, encoding) = match Encoding::for_bom(data) {
        Some((encoding, bom_len)) => (&data[bom_len..], Some(encoding)),
        None => (data, declared_encoding(data)),
    };

    match encoding {
        Some(encoding) if encoding != encoding_rs::UTF_8 => Ok(transcode(data, encoding)),
        _ => validate_utf8(data).map(Cow::Borrowed),
    }
}

fn validate_utf8(data: &[u8]) -> Result<&str, DatexError> {
    simdutf8::compat::from_utf8(data).map_err(|e| {
        DatexError::invalid_encoding(
            "UTF-8",
            format!("invalid byte sequence at {}", e.valid_up_to()),
        )
    })
}

/// Lit l'encodage déclaré dans `<?xml ... encoding="..."?>`
///
/// Retourne `None` sans déclaration, sans attribut `encoding`, ou pour un
/// label inconnu d'`encoding_rs`.
pub fn declared_encoding(data: &[u8]) -> Option<&'static Encoding> {
    if !data.starts_with(b"<?xml") {
        return None;
    }

    let head = &data[..data.len().min(PROLOG_LIMIT)];
    let prolog_end = memmem::find(head, b"?>")?;
    let prolog = &head[..prolog_end];

    let attr = memmem::find(prolog, b"encoding")?;
    let rest = &prolog[attr + b"encoding".len()..];
    let eq = rest.iter().position(|&b| b == b'=')?;
    let rest = &rest[eq + 1..];

    // Valeur entre guillemets simples ou doubles
    let open = rest.iter().position(|&b| b == b'"' || b == b'\'')?;
    let quote = rest[open];
    let value = &rest[open + 1..];
    let close = value.iter().position(|&b| b == quote)?;
    let label = &value[..close];

    let encoding = Encoding::for_label(label);
    if encoding.is_none() {
        warn!(
            label = %String::from_utf8_lossy(label),
            "Unknown XML encoding label, assuming UTF-8"
        );
    }
    encoding
}

fn transcode<'a>(data: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    debug!(encoding = encoding.name(), "Transcoding feed to UTF-8");
    let (decoded, had_errors) = encoding.decode_without_bom_handling(data);
    if had_errors {
        warn!(
            encoding = encoding.name(),
            "Malformed sequences replaced while decoding feed"
        );
    }
    decoded
}
