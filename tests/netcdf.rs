#![cfg(feature = "netcdf")]

use std::path::Path;

use chrono::NaiveDate;
use jasmin_tracks::bindings;
use jasmin_tracks::prelude::*;
use jasmin_tracks::template::Value;
use jasmin_tracks::track::{Time, Values};

const SAMPLE: &str = "tests/data/tr_trs_pos.2day_addvorT63_addmslp.tcident.new.nc";

fn at(d: u32, h: u32) -> Time {
    Time::Stamp(
        NaiveDate::from_ymd_opt(1980, 9, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap(),
    )
}

#[test]
fn load_named_fields() {
    let names = vec!["vorticity850hPa".to_string(), "mslp".to_string()];
    let t = TrackNetcdf
        .load(Path::new(SAMPLE), Some(names.as_slice()))
        .unwrap();

    assert_eq!(t.len(), 5);
    assert_eq!(t.track_ids().unwrap().to_vec(), vec![3, 3, 3, 8, 8]);
    assert_eq!(
        t.get("time").unwrap().as_time().unwrap().to_vec(),
        vec![at(1, 0), at(1, 6), at(1, 12), at(15, 18), at(16, 0)]
    );
    assert_eq!(
        t.get("lon").unwrap().as_float().unwrap().to_vec(),
        vec![320.5, 319.8, 319.0, 140.0, 139.2]
    );
    assert_eq!(
        t.get("vorticity").unwrap().as_float().unwrap().to_vec(),
        vec![3.1, 3.4, 3.9, 2.5, 2.8]
    );

    let mslp = t.get("mslp").unwrap().as_float().unwrap();
    assert_eq!(mslp[0], 1001.);
    assert!(mslp[4].is_nan());

    assert_eq!(
        t.names().collect::<Vec<_>>(),
        vec![
            "track_id",
            "time",
            "lon",
            "lat",
            "vorticity",
            "vorticity850hPa_lon",
            "vorticity850hPa_lat",
            "vorticity850hPa",
            "mslp"
        ]
    );

    assert!(TrackNetcdf.load(Path::new(SAMPLE), Some(&names[..1])).is_err());
}

#[test]
fn cmip6_tree() {
    let dir = tempfile::tempdir().unwrap();
    let catalogue = Catalogue::builtin(dir.path());

    for experiment in ["historical", "highresSST-present"] {
        let d = dir.path().join(format!(
            "CMIP6/TC/CMIP6/MOHC/HadGEM3-GC31-LL/{experiment}/TC/\
             NHHadGEM3-GC31-LL_{experiment}_r1i1p1f1_gn_VOR850_jan-dec1980_T42"
        ));
        std::fs::create_dir_all(&d).unwrap();
        std::fs::copy(SAMPLE, d.join("tr_trs_pos.2day_addvorT63_addwind.tcident.new.nc")).unwrap();
    }

    let t = get_tracks(
        &catalogue,
        "CMIP6",
        None,
        &bindings! { "experiment" => "historical" },
    )
    .unwrap();

    assert_eq!(t.len(), 5);
    assert!(!t.contains("experiment"));
    assert_eq!(
        t.get("hemisphere").unwrap().as_text().unwrap().to_vec(),
        vec!["NH"; 5]
    );
    assert_eq!(
        t.get("model_variant"),
        Some(&Values::constant(&Value::from("HadGEM3-GC31-LL"), 5))
    );
    assert_eq!(
        t.get("feature_0_lon").unwrap().as_float().unwrap()[3],
        140.0
    );

    let all = get_tracks(&catalogue, "CMIP6", None, &bindings! {}).unwrap();
    assert_eq!(all.len(), 10);
    assert_eq!(
        all.get("experiment").unwrap().as_text().unwrap()[0],
        "highresSST-present"
    );
}
