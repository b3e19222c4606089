//! Settings taken from the environment.
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use log::debug;

use crate::catalogue::{Catalogue, DEFAULT_ROOT};

/// Overrides the data root of the built-in catalogue.
pub const ROOT_VAR: &str = "JASMIN_TRACKS_ROOT";

/// Names a JSON file with extra catalogue entries.
pub const CATALOGUE_VAR: &str = "JASMIN_TRACKS_CATALOGUE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: PathBuf,
    pub catalogue: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root: PathBuf::from(DEFAULT_ROOT),
            catalogue: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_vars(|k| std::env::var_os(k))
    }

    /// Read the settings through `get`. Empty values count as unset.
    pub fn from_vars(get: impl Fn(&str) -> Option<OsString>) -> Config {
        let get = |k: &str| get(k).filter(|v| !v.is_empty()).map(PathBuf::from);

        let mut config = Config::default();
        if let Some(root) = get(ROOT_VAR) {
            config.root = root;
        }
        config.catalogue = get(CATALOGUE_VAR);
        config
    }

    /// The built-in catalogue below `root`, extended with the entries of the catalogue file.
    pub fn catalogue(&self) -> Result<Catalogue, anyhow::Error> {
        let mut c = Catalogue::builtin(&self.root);

        if let Some(path) = &self.catalogue {
            debug!("reading catalogue entries from {}", path.display());
            let f = File::open(path)
                .with_context(|| format!("opening catalogue {}", path.display()))?;
            c.extend_from_json(BufReader::new(f))
                .with_context(|| format!("reading catalogue {}", path.display()))?;
        }

        Ok(c)
    }
}
