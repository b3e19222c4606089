//! # JASMIN tracks
//!
//! A catalogue of the tropical-cyclone track datasets kept in the HURACAN group workspace on
//! JASMIN, and the tools to find and load them.
//!
//! Each dataset is described by a path [template](template::Template) with named fields such as
//! `{hemisphere}` or `{year:04d}`. Binding some of the fields gives a glob pattern for finding
//! files; matching a found path against the template recovers the remaining fields.
//!
//! ## Usage
//!
//! Find the files of one year of ERA5 tracks, then load them into one table:
//!
//! ```no_run
//! use jasmin_tracks::bindings;
//! use jasmin_tracks::prelude::*;
//!
//! let catalogue = Catalogue::default();
//! let era5 = catalogue.dataset("ERA5").unwrap();
//!
//! for f in era5.find_files(&bindings! { "year" => 1979 }).unwrap() {
//!     println!("{}: {:?}", f.display(), era5.file_details(&f).unwrap());
//! }
//!
//! let tracks = get_tracks(&catalogue, "ERA5", None, &bindings! { "year" => 1979 }).unwrap();
//! println!("{tracks}");
//! ```
//!
//! The files are read by a [`Loader`](track::Loader): [`TrackFile`](track::TrackFile) reads the
//! text output of TRACK, gzipped or not, and its netCDF output when the `netcdf` feature is
//! enabled. Fields found in the file paths are added to the table as variables, and
//! the vorticity at several pressure levels is gathered into a profile.

#[macro_use]
extern crate anyhow;

pub mod catalogue;
#[cfg(feature = "clap")]
pub mod cli;
pub mod combine;
pub mod config;
pub mod dataset;
pub mod filters;
pub mod template;
pub mod track;

pub mod prelude {
    pub use crate::catalogue::Catalogue;
    pub use crate::combine::get_tracks;
    pub use crate::config::Config;
    pub use crate::dataset::TrackDataset;
    pub use crate::template::{Bindings, Template, Value};
    pub use crate::track::{Loader, TrackAscii, TrackFile, Tracks};
    #[cfg(feature = "netcdf")]
    pub use crate::track::TrackNetcdf;
}
