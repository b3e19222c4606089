//! The netCDF output of TRACK.
//!
//! Points of all tracks are stored one after the other along the `record` dimension. Each track
//! has a `TRACK_ID` and covers `NUM_PTS` records starting at `FIRST_PT`. Next to `time`,
//! `longitude`, `latitude` and `relative_vorticity` the added fields are stored as `feature_{n}`,
//! with `feature_{n}_longitude` and `feature_{n}_latitude` for fields that carry a position.
use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use log::debug;
use ndarray::Array1;

use super::{mask_missing, Loader, Time, Tracks, Values};
use crate::template::Template;

const RECORD: &str = "record";

/// Variables that are read into the fixed columns, or only describe the track layout.
const LAYOUT: &[&str] = &[
    "TRACK_ID",
    "FIRST_PT",
    "NUM_PTS",
    "index",
    "track_id",
    "time",
    "longitude",
    "lon",
    "latitude",
    "lat",
    "relative_vorticity",
    "vorticity",
];

/// Loader for TRACK netCDF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackNetcdf;

impl Loader for TrackNetcdf {
    fn load(&self, path: &Path, variable_names: Option<&[String]>) -> Result<Tracks, anyhow::Error> {
        let file = netcdf::open(path).with_context(|| format!("opening {}", path.display()))?;
        read(&file, variable_names).with_context(|| format!("reading {}", path.display()))
    }
}

fn read(file: &netcdf::File, variable_names: Option<&[String]>) -> Result<Tracks, anyhow::Error> {
    let records = file
        .dimension(RECORD)
        .map(|d| d.len())
        .ok_or_else(|| anyhow!("no {RECORD} dimension"))?;
    debug!("{records} track points");

    let mut tracks = Tracks::new(records);
    tracks.insert("track_id", Values::Int(Array1::from(track_ids(file, records)?)))?;

    let time = variable(file, &["time"])?;
    let units = text_attribute(&time, "units")?
        .filter(|u| u.contains(" since "))
        .map(|u| time_units(&u))
        .transpose()?;
    let time = floats(&time)?
        .into_iter()
        .map(|v| to_time(v, units))
        .collect::<Result<Vec<_>, _>>()?;
    tracks.insert("time", Values::Time(Array1::from(time)))?;

    for (name, candidates) in [
        ("lon", &["longitude", "lon"][..]),
        ("lat", &["latitude", "lat"][..]),
        ("vorticity", &["relative_vorticity", "vorticity"][..]),
    ] {
        let values = floats(&variable(file, candidates)?)?;
        tracks.insert(name, Values::Float(values.into_iter().map(mask_missing).collect()))?;
    }

    let feature = Template::parse("feature_{n:d}")?;
    for var in file.variables() {
        let name = var.name();
        let along_records = matches!(var.dimensions(), [d] if d.name() == RECORD);
        if LAYOUT.contains(&name.as_str()) || !along_records {
            continue;
        }

        let renamed = rename(&feature, &name, variable_names)?;
        let values = floats(&var)?;
        tracks.insert(
            renamed,
            Values::Float(values.into_iter().map(mask_missing).collect()),
        )?;
    }

    Ok(tracks)
}

/// The track of every record, from a `track_id` variable or from the track layout.
fn track_ids(file: &netcdf::File, records: usize) -> Result<Vec<i64>, anyhow::Error> {
    if let Some(var) = file.variable("track_id") {
        return ints(&var);
    }

    let ids = ints(&variable(file, &["TRACK_ID"])?)?;
    let first = ints(&variable(file, &["FIRST_PT"])?)?;
    let num = ints(&variable(file, &["NUM_PTS"])?)?;
    ensure!(
        ids.len() == first.len() && ids.len() == num.len(),
        "TRACK_ID, FIRST_PT and NUM_PTS differ in length"
    );

    let mut out = vec![None; records];
    for ((&id, &first), &num) in ids.iter().zip(&first).zip(&num) {
        ensure!(
            first >= 0 && num >= 0 && (first + num) as usize <= records,
            "track {id} covers records {first}..{} of {records}",
            first + num
        );
        for r in &mut out[first as usize..(first + num) as usize] {
            ensure!(r.is_none(), "tracks overlap at track {id}");
            *r = Some(id);
        }
    }

    out.into_iter()
        .enumerate()
        .map(|(i, id)| id.ok_or_else(|| anyhow!("record {i} belongs to no track")))
        .collect()
}

/// Name of an added field: `feature_{n}` becomes the `n`th of `variable_names`, keeping a
/// `_lon` or `_lat` suffix.
fn rename(
    feature: &Template,
    name: &str,
    variable_names: Option<&[String]>,
) -> Result<String, anyhow::Error> {
    let (stem, suffix) = [
        ("_longitude", "_lon"),
        ("_latitude", "_lat"),
        ("_lon", "_lon"),
        ("_lat", "_lat"),
    ]
    .iter()
    .find_map(|&(s, short)| name.strip_suffix(s).map(|stem| (stem, short)))
    .unwrap_or((name, ""));

    let Some(n) = feature
        .extract(stem)
        .and_then(|b| b.get("n").and_then(|v| v.as_int()))
    else {
        return Ok(name.to_owned());
    };

    match variable_names {
        Some(names) => {
            let base = usize::try_from(n)
                .ok()
                .and_then(|n| names.get(n))
                .ok_or_else(|| anyhow!("{name}: {} variable names given", names.len()))?;
            Ok(format!("{base}{suffix}"))
        }
        None => Ok(format!("feature_{n}{suffix}")),
    }
}

/// The first of `names` found in the file.
fn variable<'f>(
    file: &'f netcdf::File,
    names: &[&str],
) -> Result<netcdf::Variable<'f>, anyhow::Error> {
    names
        .iter()
        .find_map(|n| file.variable(n))
        .ok_or_else(|| anyhow!("no {} variable", names.join(" or ")))
}

fn text_attribute(var: &netcdf::Variable, name: &str) -> Result<Option<String>, anyhow::Error> {
    let Some(attr) = var.attribute(name) else {
        return Ok(None);
    };

    Ok(match attr.value()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    })
}

fn floats(var: &netcdf::Variable) -> Result<Vec<f64>, anyhow::Error> {
    if let Ok(v) = var.get_values::<f64, _>(..) {
        return Ok(v);
    }
    if let Ok(v) = var.get_values::<f32, _>(..) {
        return Ok(v.into_iter().map(f64::from).collect());
    }
    let v = var
        .get_values::<i32, _>(..)
        .with_context(|| format!("{}: not a numeric variable", var.name()))?;
    Ok(v.into_iter().map(f64::from).collect())
}

fn ints(var: &netcdf::Variable) -> Result<Vec<i64>, anyhow::Error> {
    if let Ok(v) = var.get_values::<i64, _>(..) {
        return Ok(v);
    }
    let v = var
        .get_values::<i32, _>(..)
        .with_context(|| format!("{}: not an integer variable", var.name()))?;
    Ok(v.into_iter().map(i64::from).collect())
}

/// Seconds per unit and origin of CF time units such as `hours since 1980-09-01 00:00:00`.
fn time_units(units: &str) -> Result<(f64, NaiveDateTime), anyhow::Error> {
    let (unit, origin) = units
        .split_once(" since ")
        .ok_or_else(|| anyhow!("time units {units:?} have no origin"))?;

    let seconds = match unit.trim().to_ascii_lowercase().as_str() {
        "days" | "day" | "d" => 86400.,
        "hours" | "hour" | "h" => 3600.,
        "minutes" | "minute" | "min" => 60.,
        "seconds" | "second" | "s" => 1.,
        u => bail!("unsupported time unit {u:?}"),
    };

    let origin = origin.trim();
    let origin = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(origin, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(origin, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| anyhow!("invalid time origin {origin:?}"))?;

    Ok((seconds, origin))
}

/// Dates for times with CF units, timesteps otherwise.
fn to_time(v: f64, units: Option<(f64, NaiveDateTime)>) -> Result<Time, anyhow::Error> {
    ensure!(v.is_finite(), "invalid time {v}");

    match units {
        Some((seconds, origin)) => TimeDelta::try_seconds((v * seconds).round() as i64)
            .and_then(|d| origin.checked_add_signed(d))
            .map(Time::Stamp)
            .ok_or_else(|| anyhow!("time {v} out of range")),
        None => Ok(Time::Step(v as i64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn cf_units() {
        let (s, origin) = time_units("hours since 1980-09-01 00:00:00").unwrap();
        assert_eq!(s, 3600.);
        assert_eq!(origin, at(1980, 9, 1, 0));

        let (s, origin) = time_units("days since 1979-01-01").unwrap();
        assert_eq!(s, 86400.);
        assert_eq!(origin, at(1979, 1, 1, 0));

        assert!(time_units("hours").is_err());
        assert!(time_units("fortnights since 1979-01-01").is_err());
        assert!(time_units("hours since yesterday").is_err());
    }

    #[test]
    fn times() {
        let units = Some(time_units("hours since 1980-09-01 00:00:00").unwrap());
        assert_eq!(to_time(354., units).unwrap(), Time::Stamp(at(1980, 9, 15, 18)));
        let quarter = NaiveDate::from_ymd_opt(1980, 9, 1)
            .and_then(|d| d.and_hms_opt(0, 15, 0))
            .unwrap();
        assert_eq!(to_time(0.25, units).unwrap(), Time::Stamp(quarter));
        assert_eq!(to_time(12., None).unwrap(), Time::Step(12));
        assert!(to_time(f64::NAN, units).is_err());
        assert!(to_time(1e300, units).is_err());
    }

    #[test]
    fn added_field_names() {
        let feature = Template::parse("feature_{n:d}").unwrap();
        let names = vec!["vorticity850hPa".to_string(), "mslp".to_string()];

        assert_eq!(rename(&feature, "feature_1", None).unwrap(), "feature_1");
        assert_eq!(
            rename(&feature, "feature_0_longitude", None).unwrap(),
            "feature_0_lon"
        );
        assert_eq!(
            rename(&feature, "feature_0_latitude", Some(names.as_slice())).unwrap(),
            "vorticity850hPa_lat"
        );
        assert_eq!(
            rename(&feature, "feature_1", Some(names.as_slice())).unwrap(),
            "mslp"
        );
        assert_eq!(rename(&feature, "mslp_diff", None).unwrap(), "mslp_diff");
        assert!(rename(&feature, "feature_2", Some(names.as_slice())).is_err());
    }
}
