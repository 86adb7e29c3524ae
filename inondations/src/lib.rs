//! # inondations
//!
//! Extraction des inondations signalées par une DIR dans un flux DATEX II,
//! export GeoJSON et rapport de statistiques.
//!
//! ## Features
//!
//! - Chaîne de filtres ordonnée (autorité, type, sous-type ou mots-clés, date, coordonnées)
//! - Classification en cours / terminée par rapport à un instant fixé par exécution
//! - Statistiques par étape, par sévérité et par sous-type
//! - Écriture atomique des sorties, aucune sortie partielle en cas d'erreur
//!
//! ## Usage CLI
//!
//! ```bash
//! # Flux Bison Futé, preset DIR Ouest
//! inondations
//!
//! # Instantané local, sans écriture
//! inondations --input ./content.xml --dry-run -v
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod pipeline;
pub mod report;

pub use config::Config;
pub use error::RunError;
pub use export::GeoFeature;
pub use pipeline::{run, Clock, FixedClock, RunOutput, RunStatistics, SystemClock};
pub use report::StatsReport;
