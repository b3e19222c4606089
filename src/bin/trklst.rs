//! List the datasets of the catalogue.
use clap::Parser;

use jasmin_tracks::cli::{self, CatalogueArgs};

#[derive(Debug, Parser)]
#[command(name = "trklst", about = "List the track datasets of the catalogue")]
struct Args {
    #[command(flatten)]
    catalogue: CatalogueArgs,

    /// Print the catalogue as JSON, in the format accepted by --catalogue.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), anyhow::Error> {
    cli::init_logging();
    let args = Args::parse();

    let catalogue = args.catalogue.load()?;

    if args.json {
        println!("{}", catalogue.to_json()?);
    } else {
        println!("Datasets below {}:\n", catalogue.root().display());
        println!("{}", catalogue.summary());
    }

    Ok(())
}
