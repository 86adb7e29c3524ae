//! Rapport texte des statistiques d'une exécution
//!
//! Format de présentation uniquement, il n'est relu par aucun outil.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::config::Config;
use crate::error::RunError;
use crate::export::{stage, StagedFile};
use crate::pipeline::stats::RunStatistics;

/// Rapport de statistiques prêt à être affiché ou écrit
#[derive(Debug, Clone)]
pub struct StatsReport {
    pub title: String,
    pub zone: String,
    /// Nom court de l'autorité (ligne des records retenus à l'étape 1)
    pub authority: String,
    /// Critères de filtrage (`EnvironmentalObstruction + flooding/flashFloods`)
    pub criteria: String,
    pub generated_at: DateTime<FixedOffset>,
    pub stats: RunStatistics,
}

impl StatsReport {
    pub fn new(stats: &RunStatistics, config: &Config, generated_at: DateTime<FixedOffset>) -> Self {
        Self {
            title: config.labels.title.clone(),
            zone: config.labels.zone.clone(),
            authority: config.labels.authority.clone(),
            criteria: format!(
                "{} + {}",
                config.filter.event_marker,
                config.filter.subtypes.join("/")
            ),
            generated_at,
            stats: stats.clone(),
        }
    }

    /// Texte complet du rapport
    pub fn render(&self) -> String {
        let s = &self.stats;
        let mut out = String::new();

        // writeln! sur une String ne peut pas échouer
        let _ = writeln!(out, "🌊 {}", self.title);
        let _ = writeln!(out, "{}\n", "=".repeat(50));
        let _ = writeln!(
            out,
            "🕐 Généré le: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "📍 Zone: {}", self.zone);
        let _ = writeln!(out, "🔎 Filtre: {}\n", self.criteria);

        let _ = writeln!(out, "Situations totales: {}", s.total_situations);
        let _ = writeln!(out, "Situations {}: {}", self.authority, s.authority_matched);
        let _ = writeln!(out, "EnvironmentalObstruction: {}", s.event_type_matched);
        let _ = writeln!(out, "🌊 INONDATIONS: {}", s.floods);
        let _ = writeln!(out, "  ├─ 🔴 En cours: {}", s.active);
        let _ = writeln!(out, "  └─ 🟢 Terminées: {}", s.finished);
        let _ = writeln!(out, "⚠️  Sans coordonnées: {}", s.without_coords);
        let _ = writeln!(out, "⏱️  Sans date de début: {}\n", s.without_start);

        if !s.by_severity.is_empty() {
            let _ = writeln!(out, "Par sévérité:");
            for (severity, count) in &s.by_severity {
                let _ = writeln!(out, "  - {}: {}", severity, count);
            }
        }

        if !s.by_subtype.is_empty() {
            let _ = writeln!(out, "\nPar sous-type:");
            for (subtype, count) in &s.by_subtype {
                let _ = writeln!(out, "  - {}: {}", subtype, count);
            }
        }

        out
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        print!("{}", self.render());
        println!("{}", "=".repeat(60));
    }

    /// Prépare l'écriture du rapport, renommé au `commit`
    pub fn stage_to_file(&self, path: &Path) -> Result<StagedFile, RunError> {
        stage(path, self.render().as_bytes())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        self.stats.summary()
    }
}
