//! The track datasets of the HURACAN group workspace.
//!
//! If `.new` is in a filename the timesteps of the tracks have been converted to dates.
use std::path::Path;

use crate::dataset::{Alternative, TrackDataset};

/// Initialisation time, or the date of a forecast.
const YYYYMMDDHH: &str = "{year:04d}{month:02d}{day:02d}{hour:02d}";

/// Cyclone phase space parameters added by the `hart` step.
const CPS: [&str; 3] = ["cps_vtl", "cps_vtu", "cps_b"];

fn model_time() -> String {
    YYYYMMDDHH.replace("year", "model_year")
}

fn vorticity(levels: &[u32]) -> Vec<String> {
    levels.iter().map(|p| format!("vorticity{p}hPa")).collect()
}

fn with(mut names: Vec<String>, extra: &[&str]) -> Vec<String> {
    names.extend(extra.iter().map(|s| s.to_string()));
    names
}

pub(super) fn entries(root: &Path) -> Vec<(&'static str, Option<TrackDataset>)> {
    let mut out = Vec::new();

    // Modern reanalyses.
    let levels = vorticity(&[850, 700, 600, 500, 400, 300, 200]);
    let names = with(levels.clone(), &["mslp", "vmax925hPa", "vmax10m"]);
    let filename = "tr_trs_{sign}.2day_addT63vor_addmslp_add925wind_add10mwind";
    out.push((
        "ERA5",
        Some(
            TrackDataset::new(
                root.join("ERA5"),
                "{hemisphere}/ERA5_{year}_VOR_VERTAVG_T63/",
                format!("{filename}_addmslpavg_mslpdiff.new"),
            )
            .with_variable_names(with(names.clone(), &["mslpavg", "mslpdiff"]))
            .with_alternative(
                "nolat-tcident",
                Alternative::default()
                    .filename(format!("{filename}.nolat.tcident.hart"))
                    .variable_names(with(names.clone(), &CPS)),
            )
            .with_alternative(
                "nolat-tcident-dwcore",
                Alternative::default()
                    .filename(format!("{filename}.nolat.tcident.hart.dwcore.new"))
                    .variable_names(with(names.clone(), &CPS)),
            )
            .with_alternative(
                "tcident",
                Alternative::default()
                    .filename(format!("{filename}.tcident.new"))
                    .variable_names(names.clone()),
            )
            .with_alternative(
                "matches",
                Alternative::default()
                    .extra_path("MATCH-{hemisphere}/")
                    .filename("ERA5_{year}_match_yes.dat")
                    .variable_names(names.clone()),
            ),
        ),
    ));

    let filename = "tr_trs_{sign}.2day_addT63vor_addmslp_addw925_addw10m";
    out.push((
        "JRA3Q",
        Some(
            TrackDataset::new(
                root.join("JRA3Q/TC"),
                "{hemisphere}/JRA3Q_{year}_VOR_VERTAVG_T63/",
                format!("{filename}.new"),
            )
            .with_variable_names(names.clone())
            .with_alternative(
                "nolat-tcident",
                Alternative::default()
                    .filename(format!("{filename}.nolat.tcident.hart.new"))
                    .variable_names(with(names.clone(), &CPS)),
            )
            .with_alternative(
                "tcident",
                Alternative::default()
                    .filename(format!("{filename}.tcident.new"))
                    .variable_names(names.clone()),
            ),
        ),
    ));

    // Longer reanalyses.
    let filename = "tr_trs_{sign}.2day_addT63vor7lev_addmslp_addwind925_addwind10m";
    let tcident = Alternative::default()
        .filename(format!("{filename}.tcident.new"))
        .variable_names(names.clone());
    out.push((
        "ERA20C",
        Some(
            TrackDataset::new(
                root.join("ERA20C"),
                "{hemisphere}/ERA20C_VOR_{year:04d}_vertavg_T63/",
                format!("{filename}_addmslpavg_mslpdiff.new"),
            )
            .with_variable_names(with(names.clone(), &["mslpavg", "mslpdiff"]))
            .with_alternative("tcident", tcident.clone()),
        ),
    ));
    out.push((
        "CERA20C",
        Some(
            TrackDataset::new(
                root.join("CERA20C"),
                "{hemisphere}/CERA20C_VOR_{year}_{ensemble_member}_vertavg_T63/",
                format!("{filename}_addmslpavg_mslpdiff.new"),
            )
            .with_variable_names(with(names.clone(), &["mslpavg", "mslpdiff"]))
            .with_alternative("tcident", tcident),
        ),
    ));

    let filename = "tr_trs_pos.2day_addT63vor_addw925_addw10m_addmslp_addprecip";
    let names = with(levels, &["vmax925hPa", "vmax10m", "mslp", "precip"]);
    out.push((
        "20CRv3",
        Some(
            TrackDataset::new(
                root.join("NOAA-20CRv3/TC/NOAA-20CRv3"),
                "NOAA-20CRv3_VOR_VERTAVG_{month_range}{year}_{ensemble_member:03d}_T63/",
                filename,
            )
            .with_variable_names(names.clone())
            .with_alternative(
                "tcident",
                Alternative::default()
                    .filename(format!("{filename}.tcident.new"))
                    .variable_names(names),
            ),
        ),
    ));

    // Climate model simulations.
    out.push((
        "CMIP6",
        Some(TrackDataset::new(
            root.join("CMIP6/TC/CMIP6"),
            "{model_parent}/{model_variant}/{experiment}/TC/{hemisphere}\
             {model_variant}_{experiment}_{variant}_{grid}_VOR850_jan-dec{year}_T42/",
            "tr_trs_pos.2day_addvorT63_addwind.tcident.new.nc",
        )),
    ));
    out.push((
        "HighResMip",
        Some(TrackDataset::new(
            root.join("HiResMIP/HiResMIP"),
            "{model_parent}/{model_variant}/{experiment}/TC/{hemisphere}/\
             {model_variant}_{experiment}_{variant}_gn_VOR_vertavg_jan-dec{year}_T63",
            "tr_trs_pos.2day_addvorT63_addwind_addmslp.tcident.new.nc",
        )),
    ));
    // physics is BASE or STOC, experiment PRESENT or FUTURE, hemisphere "-SH" or empty for NH.
    out.push((
        "SPHINX",
        Some(
            TrackDataset::new(
                root.join("SPHINX/TC/SPHINX"),
                "T{spectral_resolution}-ATMOS-{physics}-{experiment}{hemisphere}/\
                 {runid}_{year}_VOR_VERTAVG_T63/",
                "{tr_or_ff}_trs_pos.addT63vor_add925w_add10w_addmslp_addprecip.tcident.hart",
            )
            .with_variable_names(with(
                (1..=6).map(|n| format!("vorticity_{n}")).collect(),
                &["v925hPa", "v10m", "mslp", "precip", "TL", "TU", "B"],
            )),
        ),
    ));
    out.push(("d4PDF", None));
    out.push(("HighResMip2", None));
    out.push(("nextGEMS", None));
    out.push(("N1280-UM", None));

    // Seasonal prediction ensembles.
    out.push((
        "GloSea5",
        Some(TrackDataset::new(root.join("GLOSEA5/TC/GLOSEA5"), "", "")),
    ));
    out.push((
        "GloSea6",
        Some(TrackDataset::new(
            root.join("GLOSEA6/TC"),
            "GLOSEA6-{experiment}/",
            "",
        )),
    ));

    out.push((
        "ASF-20C",
        Some(
            TrackDataset::new(
                root.join("ANTJE"),
                format!("{{experiment_id}}/{YYYYMMDDHH}/S2S_VOR_VERTAVG_{YYYYMMDDHH}_{{ensemble_member}}_T63/"),
                "tr_trs_pos.2day_addvorT63_addwinds925_addwinds10m_addmslp.new",
            )
            .with_variable_names(with(
                vorticity(&[850, 700, 600, 500, 300, 200]),
                &["vmax925hPa", "vmax10m", "mslp"],
            )),
        ),
    ));

    let extra_path =
        format!("{YYYYMMDDHH}/S2S_VOR850_{YYYYMMDDHH}_{{ensemble_member}}_T42_hilat/");
    let filename = "tr_trs_{sign}.2day_addvorT63_addwind850_addmslp.new";
    let names = with(vorticity(&[850, 500, 200]), &["vmax850hPa", "mslp"]);
    out.push((
        "CSF-20C",
        Some(
            TrackDataset::new(
                root.join("ANTJE/guh4"),
                extra_path.as_str(),
                format!("{filename}.gz"),
            )
            .with_variable_names(names.clone()),
        ),
    ));
    out.push((
        "SEAS5-20C",
        Some(
            TrackDataset::new(root.join("ANTJE/guxf"), extra_path.as_str(), filename)
                .with_variable_names(names.clone())
                .with_alternative(
                    "nolat-tcident",
                    Alternative::default()
                        .filename(filename.replace(".new", ".nolat.tcident.hart.new"))
                        .variable_names(with(names, &CPS)),
                ),
        ),
    ));
    out.push(("C3S", None));

    // Numerical weather prediction. The date fields are the initialisation time.
    out.push((
        "TIGGE",
        Some(TrackDataset::new(
            root.join("TIGGE/TC/TIGGE"),
            format!("{{model}}/Y{{year:04d}}/{YYYYMMDDHH}/{{model}}_VOR_{YYYYMMDDHH}_{{ensemble_member}}"),
            "tr_trs_pos.2day.addfullvor_addavgvor_addmslp_addw10m.new.gz",
        )),
    ));

    // In matched tracks the track id is 0 for the analysis, 1 for the control and 2-11 for
    // the ensemble members.
    let model = model_time();
    let names = with(
        vorticity(&[850, 700, 500, 400, 300, 200]),
        &["vmax925hPa", "vmax10m", "mslp"],
    );
    out.push((
        "ECMWF_hindcasts",
        Some(
            TrackDataset::new(
                root.join("ECMWF-HINDCASTS/TC"),
                format!(
                    "{model}/{YYYYMMDDHH}/HIND_VOR_VERTAVG_{model}_{YYYYMMDDHH}_{{ensemble_member}}/"
                ),
                "tr_trs_{sign}.2day_addvorT63_addwinds_addmslp.highres.hart.new",
            )
            .with_variable_names(with(names, &CPS))
            .with_alternative(
                "matches",
                Alternative::default()
                    .extra_path(format!(
                        "{model}/{YYYYMMDDHH}/MATCH_{{hemisphere}}_ERA5_highres/"
                    ))
                    .filename("trmatch_cntl_tr{ibtracs_id:04d}")
                    .variable_names(["vmax925hPa", "vmax10m", "mslp"]),
            ),
        ),
    ));

    let extra_path = format!("Y{{model_year:04d}}/{YYYYMMDDHH}/");
    let names = with(
        vorticity(&[850, 700, 600, 500, 400, 300, 200]),
        &["vmax925hPa", "vmax10m", "mslp"],
    );
    out.push((
        "ECMWF_Extended_Ensemble",
        Some(
            TrackDataset::new(
                root.join("EPSEXT100/TC"),
                format!("{extra_path}EPSEXT_VOR_VERTAVG_{YYYYMMDDHH}_{{ensemble_member}}/"),
                "tr_trs_{sign}.2day_addvorT63_addwinds_addmslp.hart.new",
            )
            .with_variable_names(with(names, &CPS))
            .with_alternative(
                "matches",
                Alternative::default()
                    .extra_path(format!("{extra_path}MATCH_{{hemisphere}}/"))
                    .filename("trmatch_cntl_tr{storm_number:04d}")
                    .variable_names(["vmax925hPa", "vmax10m", "mslp"]),
            ),
        ),
    ));

    // Decadal prediction systems.
    out.push((
        "DePreSys4",
        Some(TrackDataset::new(
            root.join("DePreSys4/TC/DePreSys4"),
            "DePreSys4_{run_id}_{year:04d}_{ensemble_member:d}",
            "tr_trs_pos.2day_addT63vor_addw10m_addmslp_addprecip.tcident.new",
        )),
    ));

    out
}
