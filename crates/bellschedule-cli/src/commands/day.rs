use clap::Args;
use serde::Serialize;

use super::{context, parse_date, CmdResult};

#[derive(Args)]
pub struct DayArgs {
    /// Date to show (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PeriodRow {
    key: String,
    name: String,
    start: String,
    end: String,
}

pub fn run(args: DayArgs) -> CmdResult {
    let date = parse_date(args.date.as_deref())?;
    let (config, ctx) = context()?;
    let cycle = config.display.hour_cycle;

    let Some(schedule) = ctx.calendar.schedule_for(date) else {
        if args.json {
            println!("null");
        } else {
            println!("{date}: no school");
        }
        return Ok(());
    };

    let rows: Vec<PeriodRow> = schedule
        .periods
        .iter()
        .map(|p| PeriodRow {
            key: p.key.clone(),
            name: ctx.symbol_table.render(&p.name),
            start: p.start_time.format(cycle),
            end: p.end_time.format(cycle),
        })
        .collect();

    if args.json {
        let out = serde_json::json!({
            "date": date.to_string(),
            "schedule": schedule.display_name(),
            "periods": rows,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{date}: {}", schedule.display_name());
    for row in rows {
        println!("  {:>8} - {:>8}  {}", row.start, row.end, row.name);
    }
    Ok(())
}
