use std::path::{Path, PathBuf};

use jasmin_tracks::bindings;
use jasmin_tracks::prelude::*;

const ERA5_FILE: &str =
    "tr_trs_{sign}.2day_addT63vor_addmslp_add925wind_add10mwind_addmslpavg_mslpdiff.new";

fn touch(root: &Path, path: &str) -> PathBuf {
    let p = root.join(path);
    std::fs::create_dir_all(p.parent().unwrap()).unwrap();
    std::fs::write(&p, "").unwrap();
    p
}

fn era5_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let era5 = dir.path().join("ERA5");
    for hemisphere in ["NH", "SH"] {
        for year in [1979, 1980] {
            for sign in ["pos", "neg"] {
                let file = ERA5_FILE.replace("{sign}", sign);
                touch(
                    &era5,
                    &format!("{hemisphere}/ERA5_{year}_VOR_VERTAVG_T63/{file}"),
                );
            }
        }
    }
    touch(&era5, "MATCH-NH/ERA5_1979_match_yes.dat");
    touch(&era5, "MATCH-SH/ERA5_1979_match_yes.dat");
    dir
}

fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
    files
        .iter()
        .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn bound_and_unbound_fields() {
    let dir = era5_tree();
    let catalogue = Catalogue::builtin(dir.path());
    let era5 = catalogue.dataset("ERA5").unwrap();

    assert_eq!(era5.find_files(&bindings! {}).unwrap().len(), 8);

    let files = era5
        .find_files(&bindings! { "year" => 1979, "sign" => "pos" })
        .unwrap();
    assert_eq!(
        names(&files, dir.path()),
        vec![
            format!(
                "ERA5/NH/ERA5_1979_VOR_VERTAVG_T63/{}",
                ERA5_FILE.replace("{sign}", "pos")
            ),
            format!(
                "ERA5/SH/ERA5_1979_VOR_VERTAVG_T63/{}",
                ERA5_FILE.replace("{sign}", "pos")
            ),
        ]
    );

    let files = era5
        .find_files(&bindings! { "hemisphere" => "SH", "year" => 1980, "sign" => "neg" })
        .unwrap();
    assert_eq!(files.len(), 1);

    let details = era5.file_details(&files[0]).unwrap();
    assert_eq!(
        details,
        bindings! { "hemisphere" => "SH", "year" => "1980", "sign" => "neg" }
    );
}

#[test]
fn unknown_bindings_are_ignored() {
    let dir = era5_tree();
    let catalogue = Catalogue::builtin(dir.path());
    let era5 = catalogue.dataset("ERA5").unwrap();

    let files = era5
        .find_files(&bindings! { "model" => "IFS", "sign" => "pos" })
        .unwrap();
    assert_eq!(files.len(), 4);
}

#[test]
fn alternative() {
    let dir = era5_tree();
    let catalogue = Catalogue::builtin(dir.path());
    let matches = catalogue.dataset_variant("ERA5", Some("matches")).unwrap();

    let files = matches.find_files(&bindings! { "year" => 1979 }).unwrap();
    assert_eq!(
        names(&files, dir.path()),
        vec![
            "ERA5/MATCH-NH/ERA5_1979_match_yes.dat",
            "ERA5/MATCH-SH/ERA5_1979_match_yes.dat"
        ]
    );
    assert_eq!(
        matches.file_details(&files[1]).unwrap()["hemisphere"],
        Value::from("SH")
    );
}

#[test]
fn directories_are_not_files() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "1979/a.new");
    std::fs::create_dir_all(dir.path().join("1979/b.new")).unwrap();

    let ds = TrackDataset::new(dir.path(), "{year:d}", "{name}.new");
    let files = ds.find_files(&bindings! {}).unwrap();
    assert_eq!(names(&files, dir.path()), vec!["1979/a.new"]);
}

#[test]
fn wildcards_stay_within_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "run/x.new");
    touch(dir.path(), "run/deeper/x.new");

    let ds = TrackDataset::new(dir.path(), "", "{path}/x.new");
    let files = ds.find_files(&bindings! {}).unwrap();
    assert_eq!(names(&files, dir.path()), vec!["run/x.new"]);
}

#[test]
fn special_characters_in_values() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "exp[1]/t.new");
    touch(dir.path(), "exp1/t.new");

    let ds = TrackDataset::new(dir.path(), "{experiment}", "t.new");
    let files = ds.find_files(&bindings! { "experiment" => "exp[1]" }).unwrap();
    assert_eq!(names(&files, dir.path()), vec!["exp[1]/t.new"]);
}

#[test]
fn nothing_to_search() {
    let catalogue = Catalogue::builtin("/nonexistent");
    let glosea5 = catalogue.dataset("GloSea5").unwrap();
    assert!(glosea5.find_files(&bindings! {}).is_err());

    let tigge = catalogue.dataset("TIGGE").unwrap();
    assert!(tigge.find_files(&bindings! {}).unwrap().is_empty());
}
