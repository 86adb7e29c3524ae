//! Parcours du document DATEX II et extraction des situation records
//!
//! Le lecteur est paresseux: chaque appel à `next()` avance dans le XML
//! jusqu'à la fermeture de la prochaine `situation`. Les éléments sont
//! reconnus par (URI de namespace, nom local).

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::trace;

use crate::types::{Namespaces, Situation, SituationRecord, DEFAULT_SEVERITY};
use crate::DatexError;

/// Chemin parent d'un commentaire public: `generalPublicComment/comment/values/value`
const COMMENT_PATH: [&str; 3] = ["generalPublicComment", "comment", "values"];

/// Champ en cours de capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Severity,
    Source,
    Subtype,
    Latitude,
    Longitude,
    Comment,
    Road,
    StartTime,
    EndTime,
}

#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Debug)]
struct OpenSituation {
    depth: usize,
    situation: Situation,
}

#[derive(Debug)]
struct OpenRecord {
    depth: usize,
    start: usize,
    record: SituationRecord,
}

/// Itérateur paresseux sur les situations d'un document décodé
pub struct SituationReader<'a> {
    source: &'a str,
    reader: NsReader<&'a [u8]>,
    payload_ns: Vec<u8>,
    xsi_ns: Vec<u8>,
    /// Nom local de chaque élément ouvert (`None` hors namespace payload)
    stack: Vec<Option<String>>,
    seen_root: bool,
    finished: bool,
    situation: Option<OpenSituation>,
    record: Option<OpenRecord>,
    capture: Option<Capture>,
}

impl<'a> SituationReader<'a> {
    /// Crée un lecteur sur un document déjà décodé en UTF-8
    pub fn new(source: &'a str, namespaces: &Namespaces) -> Self {
        let mut reader = NsReader::from_str(source);
        reader.trim_text(true);

        Self {
            source,
            reader,
            payload_ns: namespaces.payload.as_bytes().to_vec(),
            xsi_ns: namespaces.xsi.as_bytes().to_vec(),
            stack: Vec::new(),
            seen_root: false,
            finished: false,
            situation: None,
            record: None,
            capture: None,
        }
    }

    /// Avance jusqu'à la prochaine situation complète
    fn step(&mut self) -> Result<Option<Situation>, DatexError> {
        loop {
            let position = self.reader.buffer_position();
            let (in_payload, event) = {
                let (resolved, event) = self
                    .reader
                    .read_resolved_event()
                    .map_err(|e| DatexError::xml(position, e))?;
                (namespace_matches(&resolved, &self.payload_ns), event)
            };

            match event {
                Event::Start(e) => {
                    self.open(&e, in_payload, position)?;
                }
                Event::Empty(e) => {
                    self.open(&e, in_payload, position)?;
                    if let Some(situation) = self.close() {
                        return Ok(Some(situation));
                    }
                }
                Event::End(_) => {
                    if let Some(situation) = self.close() {
                        return Ok(Some(situation));
                    }
                }
                Event::Text(t) => {
                    if self.is_capturing() {
                        let text = t.unescape().map_err(|e| DatexError::xml(position, e))?;
                        self.push_text(&text);
                    }
                }
                Event::CData(c) => {
                    if self.is_capturing() {
                        let bytes = c.into_inner();
                        let text = String::from_utf8_lossy(&bytes);
                        self.push_text(&text);
                    }
                }
                Event::Eof => {
                    if !self.stack.is_empty() {
                        return Err(DatexError::UnexpectedEof {
                            open: self.stack.len(),
                        });
                    }
                    if !self.seen_root {
                        return Err(DatexError::EmptyDocument);
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Ouvre un élément: situation, record ou champ à capturer
    fn open(
        &mut self,
        e: &BytesStart<'_>,
        in_payload: bool,
        position: usize,
    ) -> Result<(), DatexError> {
        self.seen_root = true;

        let local = if in_payload {
            Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
        } else {
            None
        };

        if let Some(name) = local.as_deref() {
            let depth = self.stack.len() + 1;

            if name == "situation" && self.situation.is_none() {
                self.situation = Some(OpenSituation {
                    depth,
                    situation: Situation {
                        id: self.plain_attribute(e, b"id")?,
                        ..Default::default()
                    },
                });
            } else if name == "situationRecord"
                && self.situation.is_some()
                && self.record.is_none()
            {
                let record = SituationRecord {
                    situation_id: self.situation.as_ref().and_then(|s| s.situation.id.clone()),
                    record_id: self.plain_attribute(e, b"id")?,
                    severity: DEFAULT_SEVERITY.to_string(),
                    raw_type: self.xsi_type(e)?.unwrap_or_default(),
                    ..Default::default()
                };
                self.record = Some(OpenRecord {
                    depth,
                    start: position,
                    record,
                });
            } else if self.capture.is_none() {
                if let Some(field) = self.field_for(name, e)? {
                    self.capture = Some(Capture {
                        field,
                        depth,
                        text: String::new(),
                    });
                }
            }
        }

        self.stack.push(local);
        Ok(())
    }

    /// Ferme l'élément courant; retourne la situation si elle vient de se fermer
    fn close(&mut self) -> Option<Situation> {
        let depth = self.stack.len();

        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.capture.take() {
                self.commit(capture);
            }
        }

        if self.record.as_ref().is_some_and(|r| r.depth == depth) {
            if let Some(open) = self.record.take() {
                let end = self.reader.buffer_position();
                let mut record = open.record;
                record.raw = self
                    .source
                    .get(open.start..end)
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                if let Some(situation) = self.situation.as_mut() {
                    situation.situation.records.push(record);
                }
            }
        }

        self.stack.pop();

        if self.situation.as_ref().is_some_and(|s| s.depth == depth) {
            let mut situation = self.situation.take()?.situation;
            if let Some(severity) = &situation.severity {
                for record in &mut situation.records {
                    record.severity = severity.clone();
                }
            }
            trace!(
                id = ?situation.id,
                records = situation.records.len(),
                "Situation read"
            );
            return Some(situation);
        }

        None
    }

    /// Détermine si l'élément ouvert porte un champ à capturer
    fn field_for(&self, name: &str, e: &BytesStart<'_>) -> Result<Option<Field>, DatexError> {
        let Some(open) = self.situation.as_ref() else {
            return Ok(None);
        };

        if name == "overallSeverity" && open.situation.severity.is_none() {
            return Ok(Some(Field::Severity));
        }

        let Some(record) = self.record.as_ref().map(|r| &r.record) else {
            return Ok(None);
        };

        let field = match name {
            "sourceIdentification" if record.source.is_none() => Some(Field::Source),
            "environmentalObstructionType" if record.subtype.is_none() => Some(Field::Subtype),
            "latitude" => Some(Field::Latitude),
            "longitude" => Some(Field::Longitude),
            "roadNumber" if record.road.is_none() => Some(Field::Road),
            "overallStartTime" if record.start_time.is_none() => Some(Field::StartTime),
            "overallEndTime" if record.end_time.is_none() => Some(Field::EndTime),
            "value" if self.under_comment() => {
                match self.plain_attribute(e, b"lang")? {
                    Some(lang) if lang == "fr" => Some(Field::Comment),
                    _ => None,
                }
            }
            _ => None,
        };

        Ok(field)
    }

    /// Vrai si les trois éléments parents forment `generalPublicComment/comment/values`
    fn under_comment(&self) -> bool {
        if self.stack.len() < COMMENT_PATH.len() {
            return false;
        }
        let parents = &self.stack[self.stack.len() - COMMENT_PATH.len()..];
        parents
            .iter()
            .zip(COMMENT_PATH)
            .all(|(tag, expected)| tag.as_deref() == Some(expected))
    }

    fn is_capturing(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(|c| c.depth == self.stack.len())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }

    /// Range la valeur capturée dans la situation ou le record ouvert
    ///
    /// Un élément vide laisse le champ optionnel à `None`.
    fn commit(&mut self, capture: Capture) {
        let value = capture.text.trim();
        let present = (!value.is_empty()).then(|| value.to_string());

        if capture.field == Field::Severity {
            if let Some(open) = self.situation.as_mut() {
                open.situation.severity = present;
            }
            return;
        }

        let Some(record) = self.record.as_mut().map(|r| &mut r.record) else {
            return;
        };

        match capture.field {
            Field::Source => record.source = present,
            Field::Subtype => record.subtype = present,
            Field::Latitude => record.latitudes.push(value.to_string()),
            Field::Longitude => record.longitudes.push(value.to_string()),
            Field::Comment => record.comments.extend(present),
            Field::Road => record.road = present,
            Field::StartTime => record.start_time = present,
            Field::EndTime => record.end_time = present,
            Field::Severity => {}
        }
    }

    /// Lit un attribut non qualifié (`id`, `lang`)
    fn plain_attribute(
        &self,
        e: &BytesStart<'_>,
        name: &[u8],
    ) -> Result<Option<String>, DatexError> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| DatexError::xml(self.reader.buffer_position(), err))?;
            if attr.key.prefix().is_none() && attr.key.local_name().as_ref() == name {
                let value = attr
                    .unescape_value()
                    .map_err(|err| DatexError::xml(self.reader.buffer_position(), err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    /// Lit l'attribut `xsi:type` brut, préfixe compris
    fn xsi_type(&self, e: &BytesStart<'_>) -> Result<Option<String>, DatexError> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| DatexError::xml(self.reader.buffer_position(), err))?;
            let (resolved, local) = self.reader.resolve_attribute(attr.key);
            if local.as_ref() == b"type" && namespace_matches(&resolved, &self.xsi_ns) {
                let value = attr
                    .unescape_value()
                    .map_err(|err| DatexError::xml(self.reader.buffer_position(), err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }
}

impl Iterator for SituationReader<'_> {
    type Item = Result<Situation, DatexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.step() {
            Ok(Some(situation)) => Some(Ok(situation)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Compare un namespace résolu à l'URI attendue (vide = non qualifié)
fn namespace_matches(resolved: &ResolveResult<'_>, expected: &[u8]) -> bool {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => *ns == expected,
        ResolveResult::Unbound => expected.is_empty(),
        ResolveResult::Unknown(_) => false,
    }
}
