use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::template::{Bindings, Template};

/// A collection of track files sharing one path template.
///
/// The path of every file is `fixed_path / extra_path / filename`, where `fixed_path` is a
/// plain directory and `extra_path` and `filename` are [templates](crate::template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackDataset {
    pub fixed_path: PathBuf,

    #[serde(default)]
    pub extra_path: String,

    #[serde(default)]
    pub filename: String,

    /// Names of the fields added to each track point, in file order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alternatives: BTreeMap<String, Alternative>,
}

/// A named variant of a dataset. Unset fields are inherited from the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alternative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_names: Option<Vec<String>>,
}

impl Alternative {
    pub fn extra_path(mut self, extra_path: impl Into<String>) -> Self {
        self.extra_path = Some(extra_path.into());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn variable_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variable_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl TrackDataset {
    pub fn new<P>(fixed_path: P, extra_path: impl Into<String>, filename: impl Into<String>) -> Self
    where
        P: Into<PathBuf>,
    {
        TrackDataset {
            fixed_path: fixed_path.into(),
            extra_path: extra_path.into(),
            filename: filename.into(),
            variable_names: None,
            alternatives: BTreeMap::new(),
        }
    }

    pub fn with_variable_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variable_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_alternative(mut self, name: impl Into<String>, alternative: Alternative) -> Self {
        self.alternatives.insert(name.into(), alternative);
        self
    }

    /// The template below `fixed_path`.
    pub fn relative_path(&self) -> String {
        join(&[self.extra_path.as_str(), self.filename.as_str()])
    }

    /// The template of the complete path, with `fixed_path` escaped.
    pub fn full_path(&self) -> String {
        let fixed = Template::escape(&self.fixed_path.to_string_lossy());
        join(&[fixed.as_str(), self.extra_path.as_str(), self.filename.as_str()])
    }

    pub fn template(&self) -> Result<Template, anyhow::Error> {
        Template::parse(&self.full_path())
    }

    pub fn keys(&self) -> Result<Vec<String>, anyhow::Error> {
        Ok(self
            .template()?
            .keys()
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// Read `key=value` pairs into bindings typed after the fields of the path template.
    pub fn parse_bindings<'a, I>(&self, pairs: I) -> Result<Bindings, anyhow::Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let template = self.template()?;

        pairs
            .into_iter()
            .map(|(k, v)| template.typed_value(k, v).map(|v| (k.to_owned(), v)))
            .collect()
    }

    /// All files matching the template with `bindings` substituted, sorted.
    ///
    /// Unbound fields match anything within a single path component.
    pub fn find_files(&self, bindings: &Bindings) -> Result<Vec<PathBuf>, anyhow::Error> {
        let relative = Template::parse(&self.relative_path())?;
        ensure!(
            !relative.is_empty(),
            "{}: no file template to search for",
            self.fixed_path.display()
        );

        let fixed = self.fixed_path.to_string_lossy();
        let pattern = format!(
            "{}/{}",
            Pattern::escape(fixed.trim_end_matches('/')),
            relative.glob_pattern(bindings)?
        );
        debug!("searching: {pattern}");

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let mut files = glob::glob_with(&pattern, options)?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect::<Vec<_>>();
        files.sort();

        debug!("{} files match {pattern}", files.len());

        Ok(files)
    }

    /// The field values encoded in the path of a file of this dataset.
    pub fn file_details<P>(&self, path: P) -> Result<Bindings, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let s = path
            .to_str()
            .ok_or_else(|| anyhow!("path is not valid UTF-8: {}", path.display()))?;

        self.template()?
            .extract(s)
            .ok_or_else(|| anyhow!("{} does not match {}", path.display(), self.full_path()))
    }

    /// The dataset described by the alternative `name`.
    ///
    /// Fields the alternative leaves unset are taken from this dataset. The new dataset has no
    /// alternatives of its own.
    pub fn select_alternative(&self, name: &str) -> Result<TrackDataset, anyhow::Error> {
        let alt = self.alternatives.get(name).ok_or_else(|| {
            anyhow!(
                "no alternative {name:?} (available: {})",
                self.alternatives.keys().join(", ")
            )
        })?;

        Ok(TrackDataset {
            fixed_path: alt
                .fixed_path
                .clone()
                .unwrap_or_else(|| self.fixed_path.clone()),
            extra_path: alt
                .extra_path
                .clone()
                .unwrap_or_else(|| self.extra_path.clone()),
            filename: alt.filename.clone().unwrap_or_else(|| self.filename.clone()),
            variable_names: alt
                .variable_names
                .clone()
                .or_else(|| self.variable_names.clone()),
            alternatives: BTreeMap::new(),
        })
    }
}

impl fmt::Display for TrackDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.full_path())?;
        match self.template() {
            Ok(t) => write!(f, "[{}]", t.keys().iter().join(", ")),
            Err(e) => write!(f, "invalid template: {e:#}"),
        }
    }
}

/// Join path templates with single separators, skipping empty parts.
fn join(parts: &[&str]) -> String {
    let mut out = parts
        .iter()
        .filter(|p| !p.is_empty())
        .join("/");

    while out.contains("//") {
        out = out.replace("//", "/");
    }

    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings;
    use crate::template::Value;

    fn era5() -> TrackDataset {
        TrackDataset::new(
            "/data/ERA5",
            "{hemisphere}/ERA5_{year}_VOR_VERTAVG_T63/",
            "tr_trs_{sign}.2day_addmslpavg_mslpdiff.new",
        )
        .with_variable_names(["mslp", "mslpavg"])
        .with_alternative(
            "matches",
            Alternative::default()
                .extra_path("MATCH-{hemisphere}/")
                .filename("ERA5_{year}_match_yes.dat"),
        )
    }

    #[test]
    fn join_parts() {
        assert_eq!(join(&["/a/", "b/", "c"]), "/a/b/c");
        assert_eq!(join(&["/a", "", "c"]), "/a/c");
        assert_eq!(join(&["/a/", "b/", ""]), "/a/b");
        assert_eq!(join(&["/a", "b_{x}", "c"]), "/a/b_{x}/c");
        assert_eq!(join(&["/", "", ""]), "/");
    }

    #[test]
    fn full_path_and_keys() {
        let d = era5();
        assert_eq!(
            d.full_path(),
            "/data/ERA5/{hemisphere}/ERA5_{year}_VOR_VERTAVG_T63/tr_trs_{sign}.2day_addmslpavg_mslpdiff.new"
        );
        assert_eq!(d.keys().unwrap(), vec!["hemisphere", "year", "sign"]);
    }

    #[test]
    fn fixed_path_is_literal() {
        let d = TrackDataset::new("/data/{odd}", "{year}", "f");
        assert_eq!(d.keys().unwrap(), vec!["year"]);
        let b = d.file_details("/data/{odd}/1979/f").unwrap();
        assert_eq!(b, bindings! { "year" => "1979" });
    }

    #[test]
    fn details() {
        let d = era5();
        let b = d
            .file_details(
                "/data/ERA5/NH/ERA5_1979_VOR_VERTAVG_T63/tr_trs_pos.2day_addmslpavg_mslpdiff.new",
            )
            .unwrap();
        assert_eq!(b["hemisphere"], Value::from("NH"));
        assert_eq!(b["year"], Value::from("1979"));
        assert_eq!(b["sign"], Value::from("pos"));

        assert!(d.file_details("/data/ERA5/NH/other").is_err());
    }

    #[test]
    fn alternative_inherits() {
        let d = era5();
        let m = d.select_alternative("matches").unwrap();
        assert_eq!(m.fixed_path, d.fixed_path);
        assert_eq!(m.extra_path, "MATCH-{hemisphere}/");
        assert_eq!(m.filename, "ERA5_{year}_match_yes.dat");
        assert_eq!(m.variable_names, d.variable_names);
        assert!(m.alternatives.is_empty());

        assert!(d.select_alternative("nothing").is_err());
    }

    #[test]
    fn typed_bindings() {
        let d = TrackDataset::new("/data", "Y{model_year:04d}/{hemisphere}", "f");
        let b = d
            .parse_bindings([("model_year", "2016"), ("hemisphere", "NH")])
            .unwrap();
        assert_eq!(b, bindings! { "model_year" => 2016, "hemisphere" => "NH" });
        assert!(d.parse_bindings([("model_year", "x")]).is_err());
    }

    #[test]
    fn empty_template_cannot_be_searched() {
        let d = TrackDataset::new("/data/GLOSEA5", "", "");
        assert!(d.find_files(&Bindings::new()).is_err());
    }

    #[test]
    fn display() {
        let s = era5().to_string();
        let mut lines = s.lines();
        assert!(lines.next().unwrap().starts_with("/data/ERA5/{hemisphere}"));
        assert_eq!(lines.next().unwrap(), "[hemisphere, year, sign]");
    }

    #[test]
    fn serde_json() {
        let d = era5();
        let s = serde_json::to_string(&d).unwrap();
        let back: TrackDataset = serde_json::from_str(&s).unwrap();
        assert_eq!(back, d);

        let minimal: TrackDataset =
            serde_json::from_str(r#"{ "fixed_path": "/x", "filename": "{year}.dat" }"#).unwrap();
        assert_eq!(minimal.extra_path, "");
        assert!(minimal.variable_names.is_none());
    }
}
