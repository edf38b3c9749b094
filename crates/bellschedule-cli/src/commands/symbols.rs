use bellschedule_core::Config;
use clap::Subcommand;

use super::{load_context, open_persistence, CmdResult};

#[derive(Subcommand)]
pub enum SymbolsAction {
    /// List symbols with their effective values
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Override a configurable symbol
    Set {
        key: String,
        value: String,
    },
    /// Remove an override, restoring the default value
    Clear {
        key: String,
    },
}

pub fn run(action: SymbolsAction) -> CmdResult {
    let config = Config::load()?;
    let mut persistence = open_persistence()?;
    let mut ctx = load_context(&config, &mut persistence)?.context;

    match action {
        SymbolsAction::List { json } => {
            if json {
                let rows: Vec<_> = ctx
                    .symbol_table
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "key": s.key(),
                            "value": s.effective_value(),
                            "default": s.default_value(),
                            "configurable": s.is_configurable(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for s in ctx.symbol_table.iter() {
                    let marker = if s.configured_value().is_some() { "*" } else { " " };
                    println!("{marker} {} = {}", s.key(), s.effective_value());
                }
            }
        }
        SymbolsAction::Set { key, value } => {
            if !ctx.symbol_table.set_override(&key, &value) {
                return Err(format!("symbol is not configurable: {key}").into());
            }
            persistence.save_overrides(&ctx.symbol_table)?;
            println!("{key} = {value}");
        }
        SymbolsAction::Clear { key } => {
            if !ctx.symbol_table.set_override(&key, "") {
                return Err(format!("symbol is not configurable: {key}").into());
            }
            persistence.save_overrides(&ctx.symbol_table)?;
            println!("{key} reset to default");
        }
    }
    Ok(())
}
