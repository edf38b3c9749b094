use bellschedule_core::{format_countdown, LiveStatus};
use clap::Args;

use super::{context, parse_instant, CmdResult};

#[derive(Args)]
pub struct NowArgs {
    /// Instant to query instead of the current time (YYYY-MM-DDTHH:MM[:SS])
    #[arg(long)]
    at: Option<String>,
}

pub fn run(args: NowArgs) -> CmdResult {
    let at = parse_instant(args.at.as_deref())?;
    let (config, ctx) = context()?;
    let cycle = config.display.hour_cycle;

    match ctx.status_at(&at) {
        LiveStatus::NoSchedule => println!("No school today"),
        LiveStatus::NoClass { schedule_name } => {
            println!("{schedule_name}: no class in session");
        }
        LiveStatus::InPeriod {
            schedule_name,
            name,
            start,
            end,
            remaining,
            ..
        } => {
            println!("{schedule_name}: {name}");
            println!("{} - {}", start.format(cycle), end.format(cycle));
            println!("{} remaining", format_countdown(remaining));
        }
    }
    Ok(())
}
