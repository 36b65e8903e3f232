use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Constituency resolution CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "zustaendig", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Data directory (boundary files, postal table, taxonomy, directory)
    #[arg(long, default_value = "data", value_hint = ValueHint::DirPath, global = true)]
    pub data_dir: PathBuf,

    /// Cache directory for geocoding results
    #[arg(long, default_value = "cache", value_hint = ValueHint::DirPath, global = true)]
    pub cache_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an address to its constituency per governmental level
    Resolve(ResolveArgs),

    /// Suggest responsible representatives for a free-text concern
    Suggest(SuggestArgs),

    /// Convert a zipped shapefile into a JSON boundary file
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Street and house number
    #[arg(long)]
    pub street: Option<String>,

    /// Postal code
    #[arg(long)]
    pub postal: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// State name, any common spelling
    #[arg(long)]
    pub state: Option<String>,
}

impl AddressArgs {
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.postal.is_none() && self.city.is_none()
    }
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Street and house number
    pub street: String,

    /// Postal code
    pub postal: String,

    /// City
    pub city: String,

    /// State name, any common spelling
    #[arg(long)]
    pub state: Option<String>,

    /// Resolve one level only (eu/federal/state/local)
    #[arg(long)]
    pub level: Option<String>,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Free-text description of the concern
    pub text: String,

    #[command(flatten)]
    pub address: AddressArgs,

    /// Maximum number of suggestions
    #[arg(short, long, default_value_t = 5)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Zipped shapefile with district polygons
    #[arg(value_hint = ValueHint::FilePath)]
    pub archive: PathBuf,

    /// Governmental level of the districts (eu/federal/state/local)
    #[arg(long)]
    pub level: String,

    /// State scope of the districts (omit for nationwide collections)
    #[arg(long)]
    pub state: Option<String>,

    /// Output directory (defaults to the data directory)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out: Option<PathBuf>,
}
