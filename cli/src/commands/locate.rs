use anyhow::{bail, Result};

use super::load_index;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::LocateArgs) -> Result<()> {
    let index = load_index(&args.counties)?;

    let Some(county) = index.locate(args.lon, args.lat) else {
        bail!("no county contains ({}, {})", args.lon, args.lat);
    };

    let fips = county.fips().map(|f| f.to_string()).unwrap_or_default();
    println!("{}\t{}\t{}", county.geo_id, fips, county.name);

    Ok(())
}
