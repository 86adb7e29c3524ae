//! Pipeline: extraction, filtrage, classification, assemblage
//!
//! Un seul passage sur le document. L'instant de référence est lu une fois
//! sur l'horloge fournie, avant le premier record.

pub mod filter;
pub mod stats;
pub mod subtype;
pub mod temporal;

use datex::SituationReader;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RunError;
use crate::export::feature::{assemble, GeoFeature};

pub use filter::{Accepted, FilterChain, FilterOutcome, Stage};
pub use stats::RunStatistics;
pub use subtype::{Resolution, SubtypeResolver};
pub use temporal::{
    classify, parse_timestamp, ClassifiedStatus, Clock, FeatureStatus, FixedClock, SystemClock,
};

/// Résultat d'une exécution du pipeline
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Features dans l'ordre du document
    pub features: Vec<GeoFeature>,
    pub stats: RunStatistics,
}

/// Exécute le pipeline sur un flux brut
///
/// # Errors
///
/// Un flux illisible (encodage, XML mal formé ou tronqué) interrompt
/// l'exécution. Les records inexploitables sont seulement comptés.
pub fn run(xml: &[u8], config: &Config, clock: &dyn Clock) -> Result<RunOutput, RunError> {
    let chain = FilterChain::new(&config.filter)?;
    let namespaces = config.namespaces.to_datex();
    let text = datex::decode(xml)?;
    let now = clock.now();

    let mut stats = RunStatistics::new();
    let mut features = Vec::new();

    for situation in SituationReader::new(&text, &namespaces) {
        let situation = situation?;
        stats.record_situation();

        if situation.id.is_none() {
            warn!("Situation without id attribute");
        }

        for record in &situation.records {
            match chain.apply(record, &now, &mut stats) {
                FilterOutcome::Accepted(accepted) => {
                    debug!(
                        situation = record.situation_id.as_deref().unwrap_or("?"),
                        record = record.record_id.as_deref().unwrap_or("?"),
                        subtype = %accepted.subtype,
                        resolution = ?accepted.resolution,
                        active = accepted.status.is_active,
                        "Record accepted"
                    );
                    stats.record_accepted(&record.severity, &accepted.subtype);
                    features.push(assemble(record, &accepted, &config.labels, clock.now()));
                }
                FilterOutcome::Rejected(stage) => {
                    debug!(
                        situation = record.situation_id.as_deref().unwrap_or("?"),
                        record = record.record_id.as_deref().unwrap_or("?"),
                        stage = stage.label(),
                        "Record dropped"
                    );
                }
            }
        }
    }

    if stats.without_start > 0 {
        warn!(count = stats.without_start, "Flood records without usable start time");
    }
    if stats.without_coords > 0 {
        warn!(count = stats.without_coords, "Flood records without usable coordinates");
    }

    info!(
        situations = stats.total_situations,
        floods = stats.floods,
        active = stats.active,
        finished = stats.finished,
        features = features.len(),
        "Pipeline completed"
    );

    Ok(RunOutput { features, stats })
}
