use log::debug;
use ndarray::{Array1, Array2};

use super::{Tracks, Values};
use crate::template::Template;

/// Collapse the per-level vorticity variables into profiles over a `pressure` coordinate.
///
/// Variables named like `vorticity850hPa` (any case) become columns of `relative_vorticity`,
/// with their `_lon` and `_lat` companions in `relative_vorticity_lon` and
/// `relative_vorticity_lat`. Levels keep the order the variables have in the table.
pub fn gather_vorticity_profile(mut tracks: Tracks) -> Result<Tracks, anyhow::Error> {
    let level = Template::parse("vorticity{n}hpa")?;

    let mut found = Vec::new();
    for name in tracks.names() {
        if let Some(b) = level.extract(name) {
            let n = b
                .get("n")
                .map(ToString::to_string)
                .ok_or_else(|| anyhow!("{name}: no pressure level"))?;
            let p: f64 = n
                .parse()
                .map_err(|_| anyhow!("{name}: pressure level {n} is not a number"))?;
            found.push((name.to_string(), p));
        }
    }

    if found.is_empty() {
        debug!("no vorticity levels to gather");
        return Ok(tracks);
    }

    let shape = (tracks.len(), found.len());
    let mut vorticity = Array2::<f64>::zeros(shape);
    let mut vorticity_lon = Array2::<f64>::zeros(shape);
    let mut vorticity_lat = Array2::<f64>::zeros(shape);

    for (j, (name, _)) in found.iter().enumerate() {
        for (suffix, out) in [
            ("", &mut vorticity),
            ("_lon", &mut vorticity_lon),
            ("_lat", &mut vorticity_lat),
        ] {
            let var = format!("{name}{suffix}");
            let values = tracks
                .remove(&var)
                .ok_or_else(|| anyhow!("{var} is needed for the vorticity profile"))?;
            let kind = values.kind();
            let column = values
                .into_float()
                .ok_or_else(|| anyhow!("{var} is {kind}, expected float"))?;
            out.column_mut(j).assign(&column);
        }
    }

    let levels: Array1<f64> = found.iter().map(|(_, p)| *p).collect();
    debug!("gathered vorticity at {} levels: {levels}", levels.len());

    tracks.set_pressure(levels)?;
    tracks.insert("relative_vorticity", Values::Profile(vorticity))?;
    tracks.insert("relative_vorticity_lon", Values::Profile(vorticity_lon))?;
    tracks.insert("relative_vorticity_lat", Values::Profile(vorticity_lat))?;

    Ok(tracks)
}
