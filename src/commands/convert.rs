use anyhow::Result;

use crate::boundary::{convert_zip, state_slug};
use crate::cli::{Cli, ConvertArgs};
use crate::common::ensure_dir_exists;
use crate::types::Level;

pub fn run(cli: &Cli, args: &ConvertArgs) -> Result<()> {
    let level: Level = args.level.parse()?;
    let out_dir = args.out.as_ref().unwrap_or(&cli.data_dir);
    ensure_dir_exists(out_dir)?;

    let file_name = match &args.state {
        Some(state) => format!("{}_{}.geojson", level.to_str(), state_slug(state)),
        None => format!("{}.geojson", level.to_str()),
    };
    let out_path = out_dir.join(file_name);

    if cli.verbose > 0 {
        eprintln!("[convert] {} -> {}", args.archive.display(), out_path.display());
    }

    let count = convert_zip(&args.archive, level, args.state.as_deref(), &out_path)?;
    println!("Wrote {count} district polygons to {}", out_path.display());
    Ok(())
}
