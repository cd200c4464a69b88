use std::path::PathBuf;

/// County coverage zones CLI
#[derive(clap::Parser, Debug)]
#[command(name = "coverzone", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build the hex grid for one county and write it as GeoJSON
    Grid(GridArgs),

    /// Print the county containing a point
    Locate(LocateArgs),

    /// Convert between FIPS codes and county GEO_IDs
    Fips(FipsArgs),
}

#[derive(clap::Args, Debug)]
pub struct GridArgs {
    /// County dataset: a GeoJSON file, or an http(s) URL
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub counties: String,

    /// County GEO_ID (0500000US17019) or FIPS code (17019)
    pub county: String,

    /// Editor config file (JSON); flags below override it
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Resolution knob; larger gives smaller hexes
    #[arg(short, long)]
    pub grid_size: Option<u32>,

    /// Clip hexes to the county boundary
    #[arg(long, overrides_with = "no_clip")]
    pub clip: bool,

    /// Keep whole hexes along the boundary
    #[arg(long, overrides_with = "clip")]
    pub no_clip: bool,

    /// Hexes processed per idle slot
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Output GeoJSON file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct LocateArgs {
    /// County dataset: a GeoJSON file, or an http(s) URL
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub counties: String,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
}

#[derive(clap::Args, Debug)]
pub struct FipsArgs {
    /// A 5-digit FIPS code or a county GEO_ID
    pub code: String,
}
