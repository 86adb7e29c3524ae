//! Modules d'export (features GeoJSON, écriture des fichiers)

pub mod feature;
pub mod geojson;

use std::path::{Path, PathBuf};

use crate::error::RunError;

pub use self::feature::{assemble, FeatureProperties, GeoFeature};
pub use self::geojson::{build_document, render_document, stage_document};

/// Fichier écrit à côté de sa destination, en attente de renommage
///
/// Le fichier temporaire est supprimé si le `StagedFile` est abandonné
/// sans `commit`.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    tmp_path: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Destination finale
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renomme le fichier temporaire sur sa destination
    pub fn commit(mut self) -> Result<(), RunError> {
        std::fs::rename(&self.tmp_path, &self.path).map_err(|e| RunError::write(&self.path, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            std::fs::remove_file(&self.tmp_path).ok();
        }
    }
}

/// Écrit `contents` dans `<destination>.tmp`
///
/// Le dossier parent est créé si besoin. La destination n'est pas touchée
/// avant `commit`.
pub fn stage(path: &Path, contents: &[u8]) -> Result<StagedFile, RunError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RunError::write(parent, e))?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| {
            RunError::write(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing file name"),
            )
        })?;
    tmp_name.push(".tmp");

    let staged = StagedFile {
        path: path.to_path_buf(),
        tmp_path: path.with_file_name(tmp_name),
        committed: false,
    };
    std::fs::write(&staged.tmp_path, contents).map_err(|e| RunError::write(&staged.tmp_path, e))?;
    Ok(staged)
}

/// Renomme tous les fichiers préparés, dans l'ordre
///
/// Les fichiers restants sont abandonnés au premier échec.
pub fn commit_all(files: Vec<StagedFile>) -> Result<(), RunError> {
    for file in files {
        file.commit()?;
    }
    Ok(())
}
