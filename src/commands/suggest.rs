use anyhow::Result;

use crate::cli::{Cli, SuggestArgs};
use crate::types::Address;
use crate::{Engine, EngineConfig, MatchOutcome};

pub fn run(cli: &Cli, args: &SuggestArgs) -> Result<()> {
    let address = if args.address.is_empty() {
        None
    } else {
        Some(Address {
            street: args.address.street.clone().unwrap_or_default(),
            postal_code: args.address.postal.clone().unwrap_or_default(),
            city: args.address.city.clone().unwrap_or_default(),
            state: args.address.state.clone(),
        })
    };

    if cli.verbose > 0 {
        eprintln!("[suggest] text={:?} limit={}", args.text, args.limit);
    }

    let config = EngineConfig::new(&cli.data_dir, &cli.cache_dir);
    let engine = Engine::open(&config)?;
    let result = engine.suggest(&args.text, address.as_ref(), args.limit);

    println!("{}", result.explanation);
    if result.outcome == MatchOutcome::NoMatch {
        if let Some(guidance) = &result.guidance {
            println!("{guidance}");
        }
        return Ok(());
    }

    for (rank, suggestion) in result.suggestions.iter().enumerate() {
        let rep = &suggestion.representative;
        let party = rep.party.as_deref().unwrap_or("independent");
        println!(
            "{}. {} ({party}) score={} topic={} {}",
            rank + 1,
            rep.name,
            suggestion.score,
            suggestion.matched_topic,
            suggestion.explanation,
        );
    }
    if result.suggestions.is_empty() {
        println!("No representatives on record for the suggested level.");
    }
    Ok(())
}
