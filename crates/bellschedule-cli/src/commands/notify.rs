use bellschedule_core::{apply_plan, data_dir, Config, Exhaustion, JsonFileSink};
use clap::Subcommand;

use super::{context, parse_instant, CmdResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Print the reminder plan without scheduling anything
    Plan {
        /// Plan as of this instant instead of now (YYYY-MM-DDTHH:MM[:SS])
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the pending reminders with a fresh plan
    Apply {
        #[arg(long)]
        at: Option<String>,
    },
    /// Show or change reminder settings
    Settings {
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
        /// Minutes before a period ends
        #[arg(long)]
        lead_time: Option<f64>,
        /// Skip periods named with the zero-period marker
        #[arg(long)]
        skip_zero_period: Option<bool>,
    },
}

pub fn run(action: NotifyAction) -> CmdResult {
    match action {
        NotifyAction::Plan { at, json } => {
            let now = parse_instant(at.as_deref())?;
            let (config, ctx) = context()?;
            let plan = ctx.plan_notifications(&config.notifications, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }
            for n in &plan.notifications {
                println!(
                    "{}  {}: {}",
                    n.firing_instant.format("%Y-%m-%d %H:%M:%S"),
                    n.title,
                    n.body
                );
            }
            match plan.exhaustion {
                Exhaustion::Disabled => println!("notifications are disabled"),
                Exhaustion::CapReached => println!("{} reminder(s), limit reached", plan.len()),
                Exhaustion::NoMoreData => {
                    println!("{} reminder(s), no further schedule data", plan.len())
                }
            }
        }
        NotifyAction::Apply { at } => {
            let now = parse_instant(at.as_deref())?;
            let (config, ctx) = context()?;
            let plan = ctx.plan_notifications(&config.notifications, now);

            let mut sink = JsonFileSink::new(data_dir()?.join("pending_reminders.json"));
            let count = apply_plan(&mut sink, &plan)?;
            println!("scheduled {count} reminder(s) in {}", sink.path().display());
        }
        NotifyAction::Settings {
            enable,
            disable,
            lead_time,
            skip_zero_period,
        } => {
            let mut config = Config::load()?;
            let changed = enable || disable || lead_time.is_some() || skip_zero_period.is_some();
            if enable {
                config.notifications.enabled = true;
            }
            if disable {
                config.notifications.enabled = false;
            }
            if let Some(minutes) = lead_time {
                if !minutes.is_finite() || minutes < 0.0 {
                    return Err(format!("invalid lead time: {minutes}").into());
                }
                config.notifications.lead_time_minutes = minutes;
            }
            if let Some(skip) = skip_zero_period {
                config.notifications.skip_zero_period = skip;
            }
            if changed {
                config.save()?;
            }
            println!("{}", serde_json::to_string_pretty(&config.notifications)?);
        }
    }
    Ok(())
}
