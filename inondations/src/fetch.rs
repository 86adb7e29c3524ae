//! Récupération du flux DATEX II
//!
//! Un seul appel, borné par un timeout, sans retry: un échec est fatal.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::info;

/// Erreurs de récupération du flux
#[derive(Debug, Error)]
pub enum FetchError {
    /// Erreur réseau, TLS ou timeout
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Réponse HTTP hors 2xx
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// Fichier local illisible
    #[error("Cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Vrai si l'échec vient du timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request { source, .. } if source.is_timeout())
    }
}

/// Origine du flux
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Flux distant
    Url(String),
    /// Instantané local (fixtures, exécution hors ligne)
    File(PathBuf),
}

impl FeedSource {
    /// Libellé lisible de la source
    pub fn label(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Récupère le flux complet en mémoire
pub async fn fetch(source: &FeedSource, timeout: Duration) -> Result<Bytes, FetchError> {
    let bytes = match source {
        FeedSource::Url(url) => fetch_url(url, timeout).await?,
        FeedSource::File(path) => tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|source| FetchError::File {
                path: path.clone(),
                source,
            })?,
    };

    info!(source = %source.label(), bytes = bytes.len(), "Feed retrieved");
    Ok(bytes)
}

async fn fetch_url(url: &str, timeout: Duration) -> Result<Bytes, FetchError> {
    let request_error = |source: reqwest::Error| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(request_error)?;

    let resp = client.get(url).send().await.map_err(request_error)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    resp.bytes().await.map_err(request_error)
}
