//! Arguments shared by the command line tools.
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::warn;
use tracing_subscriber::EnvFilter;

use crate::catalogue::Catalogue;
use crate::config::Config;
use crate::dataset::TrackDataset;
use crate::template::Bindings;

#[derive(Debug, Clone, clap::Args)]
pub struct CatalogueArgs {
    /// Directory holding the track datasets [default: $JASMIN_TRACKS_ROOT or the JASMIN path].
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// JSON file with catalogue entries to add or override [default: $JASMIN_TRACKS_CATALOGUE].
    #[arg(long)]
    pub catalogue: Option<PathBuf>,
}

impl CatalogueArgs {
    /// The configuration from the environment, with the flags taking precedence.
    pub fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(catalogue) = &self.catalogue {
            config.catalogue = Some(catalogue.clone());
        }
        config
    }

    pub fn load(&self) -> Result<Catalogue, anyhow::Error> {
        self.config().catalogue()
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Split `key=value` arguments and type the values after the fields of `dataset`.
pub fn bindings(dataset: &TrackDataset, args: &[String]) -> Result<Bindings, anyhow::Error> {
    let pairs = args
        .iter()
        .map(|a| {
            a.split_once('=')
                .ok_or_else(|| anyhow!("expected key=value, got {a:?}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    dataset.parse_bindings(pairs)
}

/// `path` followed by the fields read from it as `key=value`. Paths that do not match the
/// template of `dataset` are logged and skipped.
pub fn details_line(dataset: &TrackDataset, path: &Path) -> Option<String> {
    match dataset.file_details(path) {
        Ok(details) => Some(format!(
            "{} {}",
            path.display(),
            details.iter().map(|(k, v)| format!("{k}={v}")).join(" ")
        )),
        Err(e) => {
            warn!("skipping {}: failed to get details: {e}", path.display());
            None
        }
    }
}
