use bellschedule_core::{Config, ContextOrigin};

use super::{load_context, open_persistence, CmdResult};

pub fn run() -> CmdResult {
    let config = Config::load()?;
    let mut persistence = open_persistence()?;
    let outcome = load_context(&config, &mut persistence)?;

    let source = match outcome.context.origin {
        ContextOrigin::Network => "source",
        ContextOrigin::Cache => "cache",
    };
    println!(
        "loaded from {source}, last updated {}",
        outcome.context.last_updated.to_rfc3339()
    );
    println!(
        "{} schedule(s), {} calendar day(s), {} symbol(s)",
        outcome.context.calendar.schedule_table().len(),
        outcome.context.calendar.len(),
        outcome.context.symbol_table.len()
    );
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
