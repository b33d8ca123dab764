use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "acs-tract-extractor")]
#[command(about = "County-level ACS tract data to shapefile extractor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Settings file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "County FIPS lookup CSV [default: from settings]")]
    pub lookup: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch ACS statistics and tract boundaries for a county and write a shapefile.
    /// Any value not given as a flag is asked for interactively.
    Extract {
        #[arg(short, long, help = "State abbreviation, e.g. CA")]
        state: Option<String>,

        #[arg(short, long, help = "County name as in the lookup, e.g. 'Cook County'")]
        county: Option<String>,

        #[arg(short, long, help = "ACS 5-year release year, e.g. 2018")]
        year: Option<u16>,

        #[arg(
            long,
            num_args = 1..,
            value_delimiter = ',',
            help = "Variable names (not labels), e.g. DP05_0001E"
        )]
        variables: Vec<String>,

        #[arg(short, long, help = "Directory the shapefile is written to")]
        output_dir: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Table family: detailed, profile, subject, comparison [default: from settings]"
        )]
        dataset: Option<String>,

        #[arg(long, help = "Fail on non-numeric statistics instead of writing nulls")]
        strict: bool,

        #[arg(long, help = "Also bundle the shapefile components into a zip archive")]
        zip: bool,

        #[arg(long, help = "Keep the raw tract GeoJSON next to the shapefile")]
        keep_geojson: bool,

        #[arg(short, long, help = "Hide progress spinners")]
        quiet: bool,
    },

    /// Print the FIPS codes for a state and county
    Lookup {
        #[arg(short, long)]
        state: String,

        #[arg(short, long)]
        county: String,
    },

    /// List the county names the lookup knows for a state
    Counties {
        #[arg(short, long)]
        state: String,

        #[arg(short, long, help = "Show at most this many names")]
        limit: Option<usize>,
    },
}
