//! Load the tracks of a dataset and describe the table.
use clap::Parser;

use jasmin_tracks::cli::{self, CatalogueArgs};
use jasmin_tracks::combine::get_tracks;

#[derive(Debug, Parser)]
#[command(name = "trkload", about = "Load the tracks of a dataset into one table")]
struct Args {
    #[command(flatten)]
    catalogue: CatalogueArgs,

    /// Dataset name, see trklst.
    dataset: String,

    /// Fixed fields, as key=value.
    bindings: Vec<String>,

    #[arg(short, long)]
    alternative: Option<String>,
}

fn main() -> Result<(), anyhow::Error> {
    cli::init_logging();
    let args = Args::parse();

    let catalogue = args.catalogue.load()?;
    let dataset = catalogue.dataset_variant(&args.dataset, args.alternative.as_deref())?;
    let bindings = cli::bindings(&dataset, &args.bindings)?;

    let tracks = get_tracks(
        &catalogue,
        &args.dataset,
        args.alternative.as_deref(),
        &bindings,
    )?;

    let ntracks = tracks
        .track_ids()
        .and_then(|ids| ids.iter().max().map(|m| m + 1))
        .unwrap_or(0);
    println!("{ntracks} tracks, {tracks}");

    Ok(())
}
