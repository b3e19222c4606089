//! Reverse matching: recover field values from text produced by a template.
//!
//! The matcher walks the segments left to right and backtracks over the span of each field.
//! Untyped fields are lazy (shortest span first), numeric fields are greedy, so the result is
//! the same as a regular expression with `.+?` and `\d+` groups would give. A field name that
//! repeats must capture the same text every time.
use super::spec::{FormatSpec, Kind};
use super::{Bindings, Segment, Value};

pub(super) fn extract(segments: &[Segment], text: &str) -> Option<Bindings> {
    let text: Vec<char> = text.chars().collect();

    let mut m = Matcher {
        segments,
        text: &text,
        spans: vec![None; segments.len()],
    };

    if !m.match_from(0, 0) {
        return None;
    }

    let mut out = Bindings::new();
    for (segment, span) in segments.iter().zip(&m.spans) {
        if let (Segment::Field(field), Some((start, end))) = (segment, span) {
            if out.contains_key(&field.name) {
                continue;
            }

            let s: String = text[*start..*end].iter().collect();
            out.insert(field.name.clone(), convert(&field.spec, s)?);
        }
    }

    Some(out)
}

struct Matcher<'a> {
    segments: &'a [Segment],
    text: &'a [char],
    spans: Vec<Option<(usize, usize)>>,
}

impl Matcher<'_> {
    fn match_from(&mut self, seg: usize, pos: usize) -> bool {
        let segments = self.segments;
        let Some(segment) = segments.get(seg) else {
            return pos == self.text.len();
        };

        match segment {
            Segment::Literal(lit) => {
                let n = lit.chars().count();
                pos + n <= self.text.len()
                    && lit
                        .chars()
                        .zip(&self.text[pos..pos + n])
                        .all(|(a, b)| a.eq_ignore_ascii_case(b))
                    && self.match_from(seg + 1, pos + n)
            }

            Segment::Field(field) => {
                if let Some((start, end)) = self.previous(seg, &field.name) {
                    let n = end - start;
                    let same = pos + n <= self.text.len()
                        && (0..n).all(|i| {
                            self.text[start + i].eq_ignore_ascii_case(&self.text[pos + i])
                        });

                    if !same {
                        return false;
                    }

                    self.spans[seg] = Some((pos, pos + n));
                    return self.match_from(seg + 1, pos + n);
                }

                for len in candidates(&field.spec, &self.text[pos..]) {
                    self.spans[seg] = Some((pos, pos + len));
                    if self.match_from(seg + 1, pos + len) {
                        return true;
                    }
                }

                self.spans[seg] = None;
                false
            }
        }
    }

    /// Span of an earlier occurrence of `name` on the current path.
    fn previous(&self, seg: usize, name: &str) -> Option<(usize, usize)> {
        self.segments[..seg]
            .iter()
            .zip(&self.spans)
            .find_map(|(s, span)| match s {
                Segment::Field(f) if f.name == name => *span,
                _ => None,
            })
    }
}

/// Span lengths a field may take at the start of `rest`, in the order they should be tried.
fn candidates(spec: &FormatSpec, rest: &[char]) -> Vec<usize> {
    let sign = usize::from(matches!(rest.first(), Some('+' | '-')));
    let run = |from: usize| {
        rest.get(from..)
            .map_or(0, |r| r.iter().take_while(|c| c.is_ascii_digit()).count())
    };

    match spec.kind {
        Kind::Any | Kind::Str => (1..=rest.len()).collect(),

        Kind::Int => {
            let n = run(sign).min(spec.width.unwrap_or(usize::MAX));
            (1..=n).rev().map(|k| sign + k).collect()
        }

        Kind::Float => {
            let whole = run(sign);
            if rest.get(sign + whole) != Some(&'.') {
                return Vec::new();
            }
            let frac = run(sign + whole + 1);
            (1..=frac).rev().map(|k| sign + whole + 1 + k).collect()
        }
    }
}

fn convert(spec: &FormatSpec, s: String) -> Option<Value> {
    match spec.kind {
        Kind::Any | Kind::Str => Some(Value::Str(s)),
        Kind::Int => s.trim_start_matches('+').parse().ok().map(Value::Int),
        Kind::Float => s.parse().ok().map(Value::Float),
    }
}
