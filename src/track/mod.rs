//! Tables of track points.
//!
//! A [`Tracks`] table has one row per track point (the `record` dimension) and an ordered set of
//! named variables. Profile variables have a second `pressure` dimension whose coordinate is
//! stored with the table.
use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use ndarray::{Array1, Array2};

use crate::template::Value;

pub mod ascii;
mod concat;
#[cfg(feature = "netcdf")]
mod nc;
mod profile;

pub use ascii::TrackAscii;
pub use concat::concat;
#[cfg(feature = "netcdf")]
pub use nc::TrackNetcdf;
pub use profile::gather_vorticity_profile;

/// Values at or above this are missing.
const MISSING: f64 = 1e25;

fn mask_missing(v: f64) -> f64 {
    if v >= MISSING {
        f64::NAN
    } else {
        v
    }
}

/// Read a file of tracks.
pub trait Loader {
    /// Load the tracks in `path`. `variable_names` names the fields stored with each point.
    fn load(&self, path: &Path, variable_names: Option<&[String]>) -> Result<Tracks, anyhow::Error>;
}

/// Loader picking the format from the file extension: netCDF for `.nc`, TRACK text otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackFile;

impl Loader for TrackFile {
    fn load(&self, path: &Path, variable_names: Option<&[String]>) -> Result<Tracks, anyhow::Error> {
        match path.extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "netcdf")]
            Some("nc") => TrackNetcdf.load(path, variable_names),
            #[cfg(not(feature = "netcdf"))]
            Some("nc") => bail!(
                "{}: reading netCDF tracks needs the `netcdf` feature",
                path.display()
            ),
            _ => TrackAscii.load(path, variable_names),
        }
    }
}

/// The time of a track point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Time {
    /// Absolute time, from files where timesteps have been converted to dates.
    Stamp(NaiveDateTime),
    /// Timestep counted from the start of the input data.
    Step(i64),
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Time::Stamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M")),
            Time::Step(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Int(Array1<i64>),
    Float(Array1<f64>),
    Text(Array1<String>),
    Time(Array1<Time>),
    /// Values over `(record, pressure)`.
    Profile(Array2<f64>),
}

impl Values {
    /// `n` copies of `value`.
    pub fn constant(value: &Value, n: usize) -> Values {
        match value {
            Value::Int(v) => Values::Int(Array1::from_elem(n, *v)),
            Value::Float(v) => Values::Float(Array1::from_elem(n, *v)),
            Value::Str(s) => Values::Text(Array1::from_elem(n, s.clone())),
        }
    }

    /// Length along the record dimension.
    pub fn len(&self) -> usize {
        match self {
            Values::Int(a) => a.len(),
            Values::Float(a) => a.len(),
            Values::Text(a) => a.len(),
            Values::Time(a) => a.len(),
            Values::Profile(a) => a.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Values::Int(_) => "int",
            Values::Float(_) => "float",
            Values::Text(_) => "text",
            Values::Time(_) => "time",
            Values::Profile(_) => "profile",
        }
    }

    pub fn as_int(&self) -> Option<&Array1<i64>> {
        match self {
            Values::Int(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&Array1<f64>> {
        match self {
            Values::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Array1<String>> {
        match self {
            Values::Text(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&Array1<Time>> {
        match self {
            Values::Time(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_profile(&self) -> Option<&Array2<f64>> {
        match self {
            Values::Profile(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_float(self) -> Option<Array1<f64>> {
        match self {
            Values::Float(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracks {
    records: usize,
    variables: Vec<(String, Values)>,
    pressure: Option<Array1<f64>>,
}

impl Tracks {
    /// An empty table with `records` rows.
    pub fn new(records: usize) -> Tracks {
        Tracks {
            records,
            ..Default::default()
        }
    }

    /// Number of track points.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(n, _)| n.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Values)> {
        self.variables.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Values> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Values> {
        self.variables
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Add a new variable.
    pub fn insert(&mut self, name: impl Into<String>, values: Values) -> Result<(), anyhow::Error> {
        let name = name.into();

        ensure!(!self.contains(&name), "{name} already exists");
        ensure!(
            values.len() == self.records,
            "{name} has {} records, expected {}",
            values.len(),
            self.records
        );

        if let Values::Profile(a) = &values {
            let levels = self
                .pressure
                .as_ref()
                .ok_or_else(|| anyhow!("{name}: profile variable without pressure coordinate"))?;
            ensure!(
                a.ncols() == levels.len(),
                "{name} has {} levels, expected {}",
                a.ncols(),
                levels.len()
            );
        }

        self.variables.push((name, values));
        Ok(())
    }

    /// Add `value` as a new variable, repeated for every record.
    pub fn assign(&mut self, name: &str, value: &Value) -> Result<(), anyhow::Error> {
        self.insert(name, Values::constant(value, self.records))
    }

    pub fn remove(&mut self, name: &str) -> Option<Values> {
        let i = self.variables.iter().position(|(n, _)| n == name)?;
        Some(self.variables.remove(i).1)
    }

    /// The `pressure` coordinate of profile variables.
    pub fn pressure(&self) -> Option<&Array1<f64>> {
        self.pressure.as_ref()
    }

    pub fn set_pressure(&mut self, levels: Array1<f64>) -> Result<(), anyhow::Error> {
        ensure!(self.pressure.is_none(), "pressure coordinate already set");
        self.pressure = Some(levels);
        Ok(())
    }

    pub fn track_ids(&self) -> Option<&Array1<i64>> {
        self.get("track_id").and_then(Values::as_int)
    }
}

impl fmt::Display for Tracks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record: {}", self.records)?;
        if let Some(p) = &self.pressure {
            write!(f, ", pressure: {} {:?}", p.len(), p.to_vec())?;
        }

        for (name, values) in &self.variables {
            let dims = match values {
                Values::Profile(_) => "(record, pressure)",
                _ => "(record)",
            };
            write!(f, "\n    {name:<32} {:<8} {dims}", values.kind())?;
        }

        Ok(())
    }
}
