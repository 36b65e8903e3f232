use anyhow::Result;
use clap::Parser;

use zustaendig::cli::{Cli, Commands};
use zustaendig::commands::{convert, resolve, suggest};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Resolve(args) => resolve::run(&cli, args),
        Commands::Suggest(args) => suggest::run(&cli, args),
        Commands::Convert(args) => convert::run(&cli, args),
    }
}
