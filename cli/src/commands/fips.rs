use anyhow::{bail, Result};
use coverzone::{Fips, fips_from_geo_id, geo_id_from_fips, state_fips};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::FipsArgs) -> Result<()> {
    let code = args.code.trim();

    if let Some(fips) = Fips::parse(code) {
        println!("{}", geo_id_from_fips(&fips));
        tracing::debug!(state = state_fips(&fips), county = fips.county(), "parsed FIPS");
    } else if let Some(fips) = fips_from_geo_id(code) {
        println!("{fips}");
    } else {
        bail!("{code:?} is neither a 5-digit FIPS code nor a county GEO_ID");
    }

    Ok(())
}
