use divan::Bencher;

use jasmin_tracks::filters::gzip;
use jasmin_tracks::track::{ascii, concat, gather_vorticity_profile};

const SAMPLE: &str = "tests/data/tr_trs_pos.2day_addvorT63_addwind850_addmslp.new";

fn names() -> Vec<String> {
    ["vorticity850hPa", "vorticity500hPa", "vorticity200hPa", "vmax850hPa", "mslp"]
        .map(String::from)
        .to_vec()
}

#[divan::bench]
fn parse_text(b: Bencher) {
    let text = std::fs::read_to_string(SAMPLE).unwrap();
    let names = names();

    b.bench_local(|| ascii::parse(&text, Some(names.as_slice())).unwrap())
}

#[divan::bench]
fn decompress(b: Bencher) {
    let raw = std::fs::read(format!("{SAMPLE}.gz")).unwrap();

    b.bench_local(|| gzip::decompress(&raw).unwrap())
}

#[divan::bench(args = [1, 10, 100])]
fn concat_and_gather(b: Bencher, files: usize) {
    let text = std::fs::read_to_string(SAMPLE).unwrap();
    let tracks = ascii::parse(&text, Some(names().as_slice())).unwrap();

    b.with_inputs(|| vec![tracks.clone(); files])
        .bench_local_values(|tables| {
            gather_vorticity_profile(concat(tables, true).unwrap()).unwrap()
        })
}

fn main() {
    divan::main();
}
