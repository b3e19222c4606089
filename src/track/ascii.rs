//! The text output format of the TRACK feature tracking software.
//!
//! ```text
//! 0
//! 0 0
//! TRACK_NUM     2 ADD_FLD    2   4 &TF&
//! TRACK_ID  1 START_TIME 1979010100
//! POINT_NUM  2
//! 1979010100 120.5 -10.2 4.1e+00 & 120.6 & -10.1 & 5.2e+00 & 1.0e+25 &
//! 1979010106 121.0 -10.5 4.5e+00 & 121.1 & -10.4 & 5.6e+00 & 1005.2 &
//! ...
//! ```
//!
//! Each point holds a time, longitude, latitude and vorticity, followed by the added fields.
//! The mask after `ADD_FLD` tells which added fields come with their own position (`T`: lon,
//! lat, value) and which are a single value (`F`).
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use ndarray::Array1;

use super::{mask_missing, Loader, Time, Tracks, Values};
use crate::filters::gzip;

/// Loader for TRACK text files, optionally gzipped. See [`TrackFile`](super::TrackFile) for
/// netCDF output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackAscii;

impl Loader for TrackAscii {
    fn load(&self, path: &Path, variable_names: Option<&[String]>) -> Result<Tracks, anyhow::Error> {
        let text = match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => {
                let raw = std::fs::read(path)?;
                String::from_utf8(gzip::decompress(&raw)?)?
            }
            _ => std::fs::read_to_string(path)?,
        };

        parse(&text, variable_names).with_context(|| format!("reading {}", path.display()))
    }
}

#[derive(Debug, PartialEq)]
struct Header {
    ntracks: usize,
    /// One entry per added field, `true` when it carries a position.
    mask: Vec<bool>,
}

impl Header {
    fn parse(line: &str) -> Result<Header, anyhow::Error> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        ensure!(tokens.first() == Some(&"TRACK_NUM"), "not a TRACK_NUM header");
        let ntracks: usize = tokens
            .get(1)
            .ok_or_else(|| anyhow!("missing number of tracks"))?
            .parse()?;

        let mask = match tokens.get(2) {
            Some(&"ADD_FLD") => {
                let nfields: usize = tokens
                    .get(3)
                    .ok_or_else(|| anyhow!("missing number of added fields"))?
                    .parse()?;

                let mask = tokens.get(5).map_or("", |m| m.trim_matches('&'));
                if mask.is_empty() {
                    vec![false; nfields]
                } else {
                    ensure!(
                        mask.len() == nfields,
                        "field mask {mask:?} does not match {nfields} added fields"
                    );
                    mask.chars()
                        .map(|c| match c {
                            'T' => Ok(true),
                            'F' => Ok(false),
                            c => Err(anyhow!("invalid character {c:?} in field mask")),
                        })
                        .collect::<Result<_, _>>()?
                }
            }
            _ => Vec::new(),
        };

        Ok(Header { ntracks, mask })
    }

    /// Names of the values following the vorticity on each point line.
    fn columns(&self, variable_names: Option<&[String]>) -> Result<Vec<String>, anyhow::Error> {
        let names: Vec<String> = match variable_names {
            Some(names) => {
                ensure!(
                    names.len() == self.mask.len(),
                    "{} variable names given for {} added fields",
                    names.len(),
                    self.mask.len()
                );
                names.to_vec()
            }
            None => (0..self.mask.len()).map(|n| format!("feature_{n}")).collect(),
        };

        Ok(names
            .into_iter()
            .zip(&self.mask)
            .flat_map(|(name, &positioned)| {
                if positioned {
                    vec![format!("{name}_lon"), format!("{name}_lat"), name]
                } else {
                    vec![name]
                }
            })
            .collect())
    }
}

#[derive(Default)]
struct Columns {
    track_id: Vec<i64>,
    time: Vec<Time>,
    lon: Vec<f64>,
    lat: Vec<f64>,
    vorticity: Vec<f64>,
    extra: Vec<Vec<f64>>,
}

/// Parse the contents of a TRACK file.
pub fn parse(text: &str, variable_names: Option<&[String]>) -> Result<Tracks, anyhow::Error> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (n, header) = lines
        .by_ref()
        .find(|(_, l)| l.starts_with("TRACK_NUM"))
        .ok_or_else(|| anyhow!("no TRACK_NUM header"))?;
    let header = Header::parse(header).with_context(|| format!("line {n}"))?;
    let names = header.columns(variable_names)?;

    let mut cols = Columns {
        extra: vec![Vec::new(); names.len()],
        ..Default::default()
    };

    let mut next = |what: &str| {
        lines
            .next()
            .ok_or_else(|| anyhow!("unexpected end of file, expected {what}"))
    };

    for _ in 0..header.ntracks {
        let (n, line) = next("TRACK_ID")?;
        let id = keyword_value(line, "TRACK_ID").with_context(|| format!("line {n}"))?;

        let (n, line) = next("POINT_NUM")?;
        let npoints = keyword_value(line, "POINT_NUM").with_context(|| format!("line {n}"))?;
        ensure!(npoints >= 0, "line {n}: negative number of points");

        for _ in 0..npoints {
            let (n, line) = next("track point")?;
            parse_point(line, &mut cols).with_context(|| format!("line {n}"))?;
            cols.track_id.push(id);
        }
    }

    let mut tracks = Tracks::new(cols.time.len());
    tracks.insert("track_id", Values::Int(Array1::from(cols.track_id)))?;
    tracks.insert("time", Values::Time(Array1::from(cols.time)))?;
    tracks.insert("lon", Values::Float(Array1::from(cols.lon)))?;
    tracks.insert("lat", Values::Float(Array1::from(cols.lat)))?;
    tracks.insert("vorticity", Values::Float(Array1::from(cols.vorticity)))?;
    for (name, values) in names.into_iter().zip(cols.extra) {
        tracks.insert(name, Values::Float(Array1::from(values)))?;
    }

    Ok(tracks)
}

/// The integer following `key` at the start of `line`.
fn keyword_value(line: &str, key: &str) -> Result<i64, anyhow::Error> {
    let mut tokens = line.split_whitespace();
    ensure!(tokens.next() == Some(key), "expected {key}, found {line:?}");

    let value = tokens.next().ok_or_else(|| anyhow!("missing value for {key}"))?;
    value
        .parse()
        .with_context(|| format!("invalid value for {key}: {value:?}"))
}

fn parse_point(line: &str, cols: &mut Columns) -> Result<(), anyhow::Error> {
    let tokens: Vec<&str> = if line.contains('&') {
        let mut parts = line.split('&');
        let mut tokens: Vec<&str> = parts.next().unwrap_or("").split_whitespace().collect();
        tokens.extend(parts.map(str::trim).filter(|s| !s.is_empty()));
        tokens
    } else {
        line.split_whitespace().collect()
    };

    ensure!(
        tokens.len() == 4 + cols.extra.len(),
        "expected {} values on track point, found {}",
        4 + cols.extra.len(),
        tokens.len()
    );

    cols.time.push(parse_time(tokens[0])?);
    cols.lon.push(value(tokens[1])?);
    cols.lat.push(value(tokens[2])?);
    cols.vorticity.push(value(tokens[3])?);
    for (col, s) in cols.extra.iter_mut().zip(&tokens[4..]) {
        col.push(value(s)?);
    }

    Ok(())
}

/// `YYYYMMDDHH` dates, or integer timesteps.
fn parse_time(s: &str) -> Result<Time, anyhow::Error> {
    if s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s[..4].parse()?;
        let month: u32 = s[4..6].parse()?;
        let day: u32 = s[6..8].parse()?;
        let hour: u32 = s[8..].parse()?;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(Time::Stamp)
            .ok_or_else(|| anyhow!("invalid date {s:?}"))
    } else {
        Ok(Time::Step(
            s.parse().with_context(|| format!("invalid time {s:?}"))?,
        ))
    }
}

fn value(s: &str) -> Result<f64, anyhow::Error> {
    let v: f64 = s.parse().with_context(|| format!("invalid number {s:?}"))?;
    Ok(mask_missing(v))
}
