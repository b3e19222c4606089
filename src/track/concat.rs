use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use ndarray::{Array, Axis, RemoveAxis};

use super::{Tracks, Values};

/// Concatenate tables along the record dimension.
///
/// Every table must have the same variables. Track ids are renumbered so that they stay unique:
/// the ids of each table are ranked (0, 1, ... in sorted order) and offset by the number of
/// distinct ids in the tables before it. With `keep_track_id` the ids as read are kept in
/// `track_id_original`.
pub fn concat(mut tables: Vec<Tracks>, keep_track_id: bool) -> Result<Tracks, anyhow::Error> {
    ensure!(!tables.is_empty(), "no tracks to concatenate");

    let mut offset = 0;
    for t in &mut tables {
        let original = t
            .track_ids()
            .ok_or_else(|| anyhow!("tracks without an integer track_id"))?
            .clone();

        let rank: BTreeMap<i64, i64> = original
            .iter()
            .copied()
            .sorted()
            .dedup()
            .zip(offset..)
            .collect();
        offset += rank.len() as i64;

        if let Some(ids) = t.get_mut("track_id") {
            *ids = Values::Int(original.mapv(|id| rank[&id]));
        }

        if keep_track_id {
            t.insert("track_id_original", Values::Int(original))?;
        }
    }

    let first = &tables[0];
    let names: BTreeSet<&str> = first.names().collect();
    for (i, t) in tables.iter().enumerate().skip(1) {
        let other: BTreeSet<&str> = t.names().collect();
        ensure!(
            names == other,
            "tables differ in variables: [{}] and [{}] (table {i})",
            names.iter().join(", "),
            other.iter().join(", ")
        );
        ensure!(
            t.pressure() == first.pressure(),
            "tables differ in pressure levels (table {i})"
        );
    }

    let mut out = Tracks::new(tables.iter().map(Tracks::len).sum());
    if let Some(p) = first.pressure() {
        out.set_pressure(p.clone())?;
    }

    for (name, values) in first.variables() {
        let joined = match values {
            Values::Int(_) => Values::Int(gather(&tables, name, Values::as_int)?),
            Values::Float(_) => Values::Float(gather(&tables, name, Values::as_float)?),
            Values::Text(_) => Values::Text(gather(&tables, name, Values::as_text)?),
            Values::Time(_) => Values::Time(gather(&tables, name, Values::as_time)?),
            Values::Profile(_) => Values::Profile(gather(&tables, name, Values::as_profile)?),
        };
        out.insert(name, joined)?;
    }

    Ok(out)
}

fn gather<'a, T, D>(
    tables: &'a [Tracks],
    name: &str,
    get: impl Fn(&'a Values) -> Option<&'a Array<T, D>>,
) -> Result<Array<T, D>, anyhow::Error>
where
    T: Clone + 'a,
    D: RemoveAxis + 'a,
{
    let views = tables
        .iter()
        .map(|t| {
            t.get(name)
                .and_then(&get)
                .map(|a| a.view())
                .ok_or_else(|| anyhow!("{name} has a different type across tables"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ndarray::concatenate(Axis(0), &views)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Value;
    use ndarray::{array, Array1, Array2};

    fn table(ids: Vec<i64>, lon: Vec<f64>) -> Tracks {
        let mut t = Tracks::new(ids.len());
        t.insert("track_id", Values::Int(Array1::from(ids))).unwrap();
        t.insert("lon", Values::Float(Array1::from(lon))).unwrap();
        t
    }

    #[test]
    fn renumbers_track_ids() {
        let a = table(vec![3, 3, 8], vec![1., 2., 3.]);
        let b = table(vec![1, 5, 5, 1], vec![4., 5., 6., 7.]);

        let t = concat(vec![a, b], true).unwrap();
        assert_eq!(t.len(), 7);
        assert_eq!(t.track_ids().unwrap(), &array![0, 0, 1, 2, 3, 3, 2]);
        assert_eq!(
            t.get("track_id_original"),
            Some(&Values::Int(array![3, 3, 8, 1, 5, 5, 1]))
        );
        assert_eq!(
            t.get("lon").unwrap().as_float().unwrap(),
            &array![1., 2., 3., 4., 5., 6., 7.]
        );
    }

    #[test]
    fn without_original_ids() {
        let t = concat(vec![table(vec![2], vec![0.])], false).unwrap();
        assert!(!t.contains("track_id_original"));
        assert_eq!(t.track_ids().unwrap(), &array![0]);
    }

    #[test]
    fn keeps_constant_fields() {
        let mut a = table(vec![1], vec![0.]);
        a.assign("year", &Value::from("1979")).unwrap();
        let mut b = table(vec![1, 2], vec![0., 1.]);
        b.assign("year", &Value::from("1980")).unwrap();

        let t = concat(vec![a, b], true).unwrap();
        assert_eq!(
            t.get("year").unwrap().as_text().unwrap().to_vec(),
            vec!["1979", "1980", "1980"]
        );
    }

    #[test]
    fn profiles() {
        let mut a = table(vec![1], vec![0.]);
        a.set_pressure(array![850., 500.]).unwrap();
        a.insert("p", Values::Profile(Array2::ones((1, 2)))).unwrap();
        let mut b = table(vec![1], vec![0.]);
        b.set_pressure(array![850., 500.]).unwrap();
        b.insert("p", Values::Profile(Array2::zeros((1, 2)))).unwrap();

        let t = concat(vec![a, b], false).unwrap();
        assert_eq!(
            t.get("p").unwrap().as_profile().unwrap(),
            &array![[1., 1.], [0., 0.]]
        );
        assert_eq!(t.pressure(), Some(&array![850., 500.]));
    }

    #[test]
    fn mismatched_tables() {
        let a = table(vec![1], vec![0.]);
        let mut b = table(vec![1], vec![0.]);
        b.assign("year", &Value::Int(1979)).unwrap();
        assert!(concat(vec![a.clone(), b], true).is_err());

        let mut c = Tracks::new(1);
        c.insert("track_id", Values::Int(array![1])).unwrap();
        c.insert("lon", Values::Int(array![0])).unwrap();
        assert!(concat(vec![a, c], true).is_err());

        assert!(concat(Vec::new(), true).is_err());
    }
}
