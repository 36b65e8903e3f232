use anyhow::Result;

use crate::cli::{Cli, ResolveArgs};
use crate::types::{Address, Level};
use crate::{Engine, EngineConfig, Resolution};

pub fn run(cli: &Cli, args: &ResolveArgs) -> Result<()> {
    let mut address = Address::new(&args.street, &args.postal, &args.city);
    if let Some(state) = &args.state {
        address.state = Some(state.clone());
    }

    if cli.verbose > 0 {
        eprintln!("[resolve] {} {} {}", args.street, args.postal, args.city);
    }

    let config = EngineConfig::new(&cli.data_dir, &cli.cache_dir);
    let engine = Engine::open(&config)?;

    match &args.level {
        Some(level) => {
            let level: Level = level.parse()?;
            print_resolution(level, &engine.resolve_level(&address, level));
        }
        None => {
            for (level, resolution) in &engine.resolve(&address).levels {
                print_resolution(*level, resolution);
            }
        }
    }
    Ok(())
}

fn print_resolution(level: Level, resolution: &Resolution) {
    match resolution {
        Resolution::Resolved { constituency, method } => {
            println!("{level}: {} [{}] (via {method:?})", constituency.name, constituency.id);
        }
        Resolution::Unresolved { guidance } => {
            println!("{level}: unresolved ({guidance})");
        }
    }
}
