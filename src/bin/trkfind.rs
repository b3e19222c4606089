//! Print the files of a dataset.
use clap::Parser;

use jasmin_tracks::cli::{self, CatalogueArgs};

#[derive(Debug, Parser)]
#[command(name = "trkfind", about = "Find the track files of a dataset")]
struct Args {
    #[command(flatten)]
    catalogue: CatalogueArgs,

    /// Dataset name, see trklst.
    dataset: String,

    /// Fixed fields, as key=value.
    bindings: Vec<String>,

    #[arg(short, long)]
    alternative: Option<String>,

    /// Also print the fields read from each path.
    #[arg(short, long)]
    details: bool,
}

fn main() -> Result<(), anyhow::Error> {
    cli::init_logging();
    let args = Args::parse();

    let catalogue = args.catalogue.load()?;
    let dataset = catalogue.dataset_variant(&args.dataset, args.alternative.as_deref())?;
    let bindings = cli::bindings(&dataset, &args.bindings)?;

    let files = dataset.find_files(&bindings)?;
    for f in &files {
        if args.details {
            if let Some(line) = cli::details_line(&dataset, f) {
                println!("{line}");
            }
        } else {
            println!("{}", f.display());
        }
    }

    log::info!("{} files", files.len());

    Ok(())
}
