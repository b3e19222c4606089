//! Format specifications of template fields.
//!
//! This is the subset of the Python format mini-language the dataset templates use:
//!
//! ```text
//! [[fill]align][sign][0][width][.precision][type]
//! ```
//!
//! with `type` one of nothing, `s`, `d` or `f`.
use std::fmt;
use std::iter;

use super::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign and the digits (`=`).
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Align> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sign {
    Plus,
    #[default]
    Minus,
    Space,
}

/// The presentation type of a field, which also decides the type of extracted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    #[default]
    Any,
    Str,
    Int,
    Float,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FormatSpec {
    raw: String,
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub sign: Sign,
    pub zero: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub kind: Kind,
}

impl FormatSpec {
    pub fn parse(raw: &str) -> Result<FormatSpec, anyhow::Error> {
        let chars: Vec<char> = raw.chars().collect();
        let mut spec = FormatSpec {
            raw: raw.to_owned(),
            ..Default::default()
        };
        let mut i = 0;

        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            spec.fill = Some(chars[0]);
            spec.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            spec.align = Some(align);
            i = 1;
        }

        let sign = match chars.get(i) {
            Some('+') => Some(Sign::Plus),
            Some('-') => Some(Sign::Minus),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if let Some(sign) = sign {
            spec.sign = sign;
            i += 1;
        }

        if chars.get(i) == Some(&'0') {
            spec.zero = true;
            i += 1;
        }

        let (width, n) = digits(&chars[i..]);
        spec.width = width;
        i += n;

        if chars.get(i) == Some(&'.') {
            i += 1;
            let (precision, n) = digits(&chars[i..]);
            ensure!(n > 0, "missing precision in format spec {raw:?}");
            spec.precision = precision;
            i += n;
        }

        let rest: String = chars[i..].iter().collect();
        spec.kind = match rest.as_str() {
            "" => Kind::Any,
            "s" => Kind::Str,
            "d" => Kind::Int,
            "f" => Kind::Float,
            other => bail!("unsupported format type {other:?} in {raw:?}"),
        };

        ensure!(
            !(spec.kind == Kind::Int && spec.precision.is_some()),
            "precision not allowed in integer format spec {raw:?}"
        );

        Ok(spec)
    }

    /// The spec as written in the template, without the leading `:`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn format(&self, value: &Value) -> Result<String, anyhow::Error> {
        match (self.kind, value) {
            (Kind::Any | Kind::Int, Value::Int(v)) => {
                Ok(self.pad(self.sign_of(*v < 0), &v.unsigned_abs().to_string(), Align::Right))
            }
            (Kind::Float, Value::Int(v)) => Ok(self.format_float(*v as f64)),
            (Kind::Any | Kind::Float, Value::Float(v)) => Ok(self.format_float(*v)),
            (Kind::Any | Kind::Str, Value::Str(s)) => {
                let body: String = match self.precision {
                    Some(p) => s.chars().take(p).collect(),
                    None => s.clone(),
                };
                Ok(self.pad("", &body, Align::Left))
            }
            (kind, value) => Err(anyhow!(
                "cannot format {value:?} as {kind:?} (format spec {:?})",
                self.raw
            )),
        }
    }

    fn format_float(&self, v: f64) -> String {
        let body = match (self.kind, self.precision) {
            (_, Some(p)) => format!("{:.*}", p, v.abs()),
            (Kind::Float, None) => format!("{:.6}", v.abs()),
            _ => v.abs().to_string(),
        };
        self.pad(self.sign_of(v.is_sign_negative()), &body, Align::Right)
    }

    fn sign_of(&self, negative: bool) -> &'static str {
        match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        }
    }

    fn pad(&self, sign: &str, body: &str, default: Align) -> String {
        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
        let align = self.align.unwrap_or(match (self.zero, default) {
            (true, Align::Right) => Align::AfterSign,
            _ => default,
        });

        let len = sign.chars().count() + body.chars().count();
        let pad = self.width.unwrap_or(0).saturating_sub(len);
        let fill_n = |n: usize| iter::repeat(fill).take(n).collect::<String>();

        match align {
            Align::Left => format!("{sign}{body}{}", fill_n(pad)),
            Align::Right => format!("{}{sign}{body}", fill_n(pad)),
            Align::Center => format!("{}{sign}{body}{}", fill_n(pad / 2), fill_n(pad - pad / 2)),
            Align::AfterSign => format!("{sign}{}{body}", fill_n(pad)),
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn digits(chars: &[char]) -> (Option<usize>, usize) {
    let n = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    let v = chars[..n]
        .iter()
        .collect::<String>()
        .parse::<usize>()
        .ok();
    (v, n)
}
