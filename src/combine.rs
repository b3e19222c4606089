//! Load every file of a dataset into one table.
use log::{debug, info, warn};

use crate::catalogue::Catalogue;
use crate::dataset::TrackDataset;
use crate::template::Bindings;
use crate::track::{concat, gather_vorticity_profile, Loader, TrackFile, Tracks};

/// Load the tracks of the catalogue entry `name` (or one of its alternatives) whose paths match
/// `bindings`.
///
/// ```no_run
/// use jasmin_tracks::{bindings, catalogue::Catalogue, combine::get_tracks};
///
/// let catalogue = Catalogue::builtin(jasmin_tracks::catalogue::DEFAULT_ROOT);
/// let tracks = get_tracks(&catalogue, "ERA5", None, &bindings! { "year" => 1979 }).unwrap();
/// println!("{tracks}");
/// ```
pub fn get_tracks(
    catalogue: &Catalogue,
    name: &str,
    alternative: Option<&str>,
    bindings: &Bindings,
) -> Result<Tracks, anyhow::Error> {
    let dataset = catalogue.dataset_variant(name, alternative)?;
    load_dataset(&dataset, bindings, &TrackFile)
}

/// Find and load the files of `dataset`, adding the fields encoded in each path that are not
/// already fixed by `bindings` as per-record variables.
pub fn load_dataset<L: Loader>(
    dataset: &TrackDataset,
    bindings: &Bindings,
    loader: &L,
) -> Result<Tracks, anyhow::Error> {
    let files = dataset.find_files(bindings)?;
    ensure!(
        !files.is_empty(),
        "no files found for {} with {bindings:?}",
        dataset.full_path()
    );
    info!("loading {} files", files.len());

    let mut tables = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        debug!("{}/{}: {}", i + 1, files.len(), path.display());

        let mut tracks = loader.load(path, dataset.variable_names.as_deref())?;

        let details = match dataset.file_details(path) {
            Ok(details) => details,
            Err(e) => {
                warn!("skipping {}: failed to get details: {e}", path.display());
                continue;
            }
        };

        for (key, value) in details.iter().filter(|(k, _)| !bindings.contains_key(*k)) {
            ensure!(
                !tracks.contains(key),
                "need to add {key} to tracks from {} but it already exists",
                path.display()
            );
            tracks.assign(key, value)?;
        }

        tables.push(tracks);
    }

    let tracks = concat(tables, true)?;
    gather_vorticity_profile(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings;
    use crate::track::Values;
    use ndarray::array;
    use std::path::Path;

    /// One point per file, with the track id taken from the file size.
    struct Stub;

    impl Loader for Stub {
        fn load(&self, path: &Path, variable_names: Option<&[String]>) -> Result<Tracks, anyhow::Error> {
            let id = std::fs::metadata(path)?.len() as i64;
            let mut t = Tracks::new(1);
            t.insert("track_id", Values::Int(array![id]))?;
            t.insert("lon", Values::Float(array![0.]))?;
            for name in variable_names.unwrap_or_default() {
                t.insert(name.as_str(), Values::Float(array![1.]))?;
            }
            Ok(t)
        }
    }

    fn tree(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let p = dir.path().join(path);
            std::fs::create_dir_all(p.parent().unwrap()).unwrap();
            std::fs::write(p, content).unwrap();
        }
        dir
    }

    #[test]
    fn details_become_variables() {
        let dir = tree(&[("1979/NH.dat", "a"), ("1979/SH.dat", "bb"), ("1980/NH.dat", "ccc")]);
        let ds = TrackDataset::new(dir.path(), "{year:d}", "{hemisphere}.dat");

        let t = load_dataset(&ds, &bindings! {}, &Stub).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.get("year"), Some(&Values::Int(array![1979, 1979, 1980])));
        assert_eq!(
            t.get("hemisphere").unwrap().as_text().unwrap().to_vec(),
            vec!["NH", "SH", "NH"]
        );
        assert_eq!(t.track_ids().unwrap(), &array![0, 1, 2]);
        assert_eq!(
            t.get("track_id_original"),
            Some(&Values::Int(array![1, 2, 3]))
        );
    }

    #[test]
    fn bound_fields_are_not_added() {
        let dir = tree(&[("1979/NH.dat", "a"), ("1979/SH.dat", "b")]);
        let ds = TrackDataset::new(dir.path(), "{year:d}", "{hemisphere}.dat");

        let t = load_dataset(&ds, &bindings! { "year" => 1979 }, &Stub).unwrap();
        assert!(!t.contains("year"));
        assert!(t.contains("hemisphere"));
    }

    #[test]
    fn clashing_detail() {
        let dir = tree(&[("lon.dat", "a")]);
        let ds = TrackDataset::new(dir.path(), "", "{lon}.dat");
        assert!(load_dataset(&ds, &bindings! {}, &Stub).is_err());
    }

    #[test]
    fn gathers_profile() {
        let dir = tree(&[("a.dat", "a")]);
        let ds = TrackDataset::new(dir.path(), "", "{run}.dat").with_variable_names([
            "vorticity850hPa_lon",
            "vorticity850hPa_lat",
            "vorticity850hPa",
        ]);

        let t = load_dataset(&ds, &bindings! {}, &Stub).unwrap();
        assert_eq!(t.pressure(), Some(&array![850.]));
        assert!(t.contains("relative_vorticity"));
    }

    #[test]
    fn no_files() {
        let dir = tree(&[]);
        let ds = TrackDataset::new(dir.path(), "{year:d}", "{hemisphere}.dat");
        assert!(load_dataset(&ds, &bindings! {}, &Stub).is_err());
    }
}
