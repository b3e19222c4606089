//! Path templates with named fields.
//!
//! A template is a format string such as `{hemisphere}/ERA5_{year}_VOR_VERTAVG_T63/` where each
//! `{name}` or `{name:spec}` is a field. Templates work in both directions: with some fields
//! bound they produce a glob pattern for finding files, and given a concrete path they recover
//! the value of every field.
//!
//! ```
//! use jasmin_tracks::bindings;
//! use jasmin_tracks::template::{Template, Value};
//!
//! let t = Template::parse("{hemisphere}/ERA20C_VOR_{year:04d}_vertavg_T63/").unwrap();
//!
//! let pattern = t.glob_pattern(&bindings! { "year" => 1979 }).unwrap();
//! assert_eq!(pattern, "*/ERA20C_VOR_1979_vertavg_T63/");
//!
//! let details = t.extract("SH/ERA20C_VOR_1979_vertavg_T63/").unwrap();
//! assert_eq!(details["hemisphere"], Value::from("SH"));
//! assert_eq!(details["year"], Value::Int(1979));
//! ```
use std::fmt;

use anyhow::Context;
use glob::Pattern;
use itertools::Itertools;

mod matcher;
pub mod spec;
mod value;

pub use spec::{FormatSpec, Kind};
pub use value::{Bindings, Value};

/// A named field of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub spec: FormatSpec,
}

impl Field {
    fn parse(s: &str) -> Result<Field, anyhow::Error> {
        let (name, spec) = s.split_once(':').unwrap_or((s, ""));

        ensure!(!name.is_empty(), "positional fields are not supported");
        ensure!(
            !name.contains('!'),
            "conversions are not supported in field {name:?}"
        );
        ensure!(
            name.chars().all(|c| c.is_alphanumeric() || c == '_')
                && !name.starts_with(|c: char| c.is_ascii_digit()),
            "invalid field name {name:?}"
        );

        Ok(Field {
            name: name.to_owned(),
            spec: FormatSpec::parse(spec)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Template, anyhow::Error> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => bail!("nested fields are not supported: {source:?}"),
                            Some(c) => field.push(c),
                            None => bail!("unclosed field in {source:?}"),
                        }
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let field = Field::parse(&field).with_context(|| format!("in {source:?}"))?;
                    segments.push(Segment::Field(field));
                }
                '}' => bail!("single '}}' in {source:?}"),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Template {
            source: source.to_owned(),
            segments,
        })
    }

    /// Escape `s` so that it is taken literally when parsed as a template.
    pub fn escape(s: &str) -> String {
        s.replace('{', "{{").replace('}', "}}")
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(f) => Some(f),
            Segment::Literal(_) => None,
        })
    }

    /// Unique `(name, spec)` pairs in order of first appearance.
    pub fn keywords(&self) -> Vec<(&str, &FormatSpec)> {
        self.fields()
            .map(|f| (f.name.as_str(), &f.spec))
            .unique()
            .collect()
    }

    /// Unique field names in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        self.fields().map(|f| f.name.as_str()).unique().collect()
    }

    /// The spec of the first field called `name`.
    pub fn spec(&self, name: &str) -> Option<&FormatSpec> {
        self.fields().find(|f| f.name == name).map(|f| &f.spec)
    }

    /// Substitute every field. All fields must be bound.
    pub fn format(&self, bindings: &Bindings) -> Result<String, anyhow::Error> {
        let mut out = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Field(f) => {
                    let v = bindings
                        .get(&f.name)
                        .ok_or_else(|| anyhow!("no value for {:?} in {:?}", f.name, self.source))?;
                    out.push_str(&f.spec.format(v)?);
                }
            }
        }

        Ok(out)
    }

    /// Substitute the bound fields and replace the unbound ones by `*`.
    ///
    /// Runs of wildcards collapse into a single `*`, so adjacent unbound fields never turn into
    /// the recursive `**`. Literal text and substituted values are escaped. Bindings for names
    /// that are not in the template are ignored.
    pub fn glob_pattern(&self, bindings: &Bindings) -> Result<String, anyhow::Error> {
        let mut out = String::with_capacity(self.source.len());
        let mut wildcard = false;

        for segment in &self.segments {
            let text = match segment {
                Segment::Literal(s) => Pattern::escape(s),
                Segment::Field(f) => match bindings.get(&f.name) {
                    Some(v) => Pattern::escape(&f.spec.format(v)?),
                    None => {
                        if !wildcard {
                            out.push('*');
                            wildcard = true;
                        }
                        continue;
                    }
                },
            };

            if !text.is_empty() {
                out.push_str(&text);
                wildcard = false;
            }
        }

        Ok(out)
    }

    /// Match the whole of `text` and return the value of every field.
    ///
    /// Literal text is compared ignoring ASCII case. Returns `None` when `text` cannot have
    /// been produced by this template.
    pub fn extract(&self, text: &str) -> Option<Bindings> {
        matcher::extract(&self.segments, text)
    }

    /// Read `raw` as a value of the type the field `name` expects.
    ///
    /// Names that are not in the template are kept as text.
    pub fn typed_value(&self, name: &str, raw: &str) -> Result<Value, anyhow::Error> {
        let kind = self.spec(name).map(|s| s.kind).unwrap_or_default();

        Ok(match kind {
            Kind::Int => Value::Int(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{name}: expected an integer, got {raw:?}"))?,
            ),
            Kind::Float => Value::Float(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{name}: expected a number, got {raw:?}"))?,
            ),
            Kind::Any | Kind::Str => Value::Str(raw.to_owned()),
        })
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
