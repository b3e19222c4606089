//! Registry of the known track datasets.
//!
//! The [built-in](Catalogue::builtin) catalogue describes the datasets of the HURACAN group
//! workspace on JASMIN. Entries can be added or overridden from JSON:
//!
//! ```
//! use jasmin_tracks::catalogue::Catalogue;
//!
//! let mut c = Catalogue::builtin("/data/TRACK");
//! c.extend_from_json(
//!     r#"{
//!         "mine": { "fixed_path": "MINE", "extra_path": "{year:d}/", "filename": "tracks.new" },
//!         "planned": null
//!     }"#
//!     .as_bytes(),
//! )
//! .unwrap();
//!
//! assert_eq!(c.dataset("mine").unwrap().full_path(), "/data/TRACK/MINE/{year:d}/tracks.new");
//! assert!(c.dataset("planned").is_err());
//! ```
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::debug;

use crate::dataset::TrackDataset;

mod builtin;

/// Where the tracks are kept on JASMIN.
pub const DEFAULT_ROOT: &str = "/gws/nopw/j04/huracan/data/tracks/tropical_cyclones/TRACK";

/// Named datasets. An entry without a dataset is a reserved name whose template is not known
/// yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    root: PathBuf,
    entries: Vec<(String, Option<TrackDataset>)>,
}

impl Catalogue {
    /// The built-in datasets, below `root`.
    pub fn builtin<P: Into<PathBuf>>(root: P) -> Catalogue {
        let mut c = Catalogue::empty(root);
        for (name, entry) in builtin::entries(&c.root) {
            c.insert(name, entry);
        }
        c
    }

    pub fn empty<P: Into<PathBuf>>(root: P) -> Catalogue {
        Catalogue {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// The directory relative fixed paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry, replacing any entry with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, entry: Option<TrackDataset>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, e)) => *e = entry,
            None => self.entries.push((name, entry)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&TrackDataset>)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e.as_ref()))
    }

    pub fn dataset(&self, name: &str) -> Result<&TrackDataset, anyhow::Error> {
        let (_, entry) = self
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| {
                anyhow!(
                    "unknown dataset {name:?} (available: {})",
                    self.names().join(", ")
                )
            })?;

        entry
            .as_ref()
            .ok_or_else(|| anyhow!("dataset {name:?} has no path template yet"))
    }

    /// The dataset `name`, or its `alternative` when given.
    pub fn dataset_variant(
        &self,
        name: &str,
        alternative: Option<&str>,
    ) -> Result<TrackDataset, anyhow::Error> {
        let dataset = self.dataset(name)?;
        match alternative {
            Some(alt) => dataset.select_alternative(alt),
            None => Ok(dataset.clone()),
        }
    }

    /// Every entry followed by its path template and keys.
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|(name, entry)| match entry {
                Some(ds) => format!("{name}\n{ds}\n"),
                None => format!("{name}\nno path template\n"),
            })
            .join("\n")
    }

    /// Add the entries of a JSON object mapping names to datasets (or `null` for reserved
    /// names). Relative fixed paths are taken to be below the root.
    pub fn extend_from_json<R: Read>(&mut self, reader: R) -> Result<(), anyhow::Error> {
        let entries: BTreeMap<String, Option<TrackDataset>> = serde_json::from_reader(reader)?;

        for (name, mut entry) in entries {
            if let Some(ds) = entry.as_mut() {
                ds.fixed_path = self.root.join(&ds.fixed_path);
                for alt in ds.alternatives.values_mut() {
                    if let Some(p) = alt.fixed_path.as_mut() {
                        *p = self.root.join(&*p);
                    }
                }
            }
            debug!("catalogue entry from json: {name}");
            self.insert(name, entry);
        }

        Ok(())
    }

    /// The catalogue as a JSON object with absolute fixed paths.
    pub fn to_json(&self) -> Result<String, anyhow::Error> {
        let entries: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(n, e)| Ok((n.clone(), serde_json::to_value(e)?)))
            .collect::<Result<_, anyhow::Error>>()?;

        Ok(serde_json::to_string_pretty(&entries)?)
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Catalogue::builtin(DEFAULT_ROOT)
    }
}
