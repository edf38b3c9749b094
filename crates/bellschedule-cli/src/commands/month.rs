use chrono::{Datelike, Local};
use clap::Args;

use super::{context, CmdResult};

#[derive(Args)]
pub struct MonthArgs {
    /// Year; defaults to the current year
    #[arg(long)]
    year: Option<i32>,
    /// Month (1-12); defaults to the current month
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
}

pub fn run(args: MonthArgs) -> CmdResult {
    let today = Local::now().date_naive();
    let year = args.year.unwrap_or(today.year());
    let month = args.month.unwrap_or(today.month());
    let (_, ctx) = context()?;

    let days = ctx.calendar.month_schedule(year, month);
    if days.is_empty() {
        println!("{year}-{month:02}: no school days");
        return Ok(());
    }
    for (day, id) in days {
        let name = ctx
            .calendar
            .schedule_table()
            .get(&id)
            .map(|s| s.display_name())
            .unwrap_or(id);
        println!("{year}-{month:02}-{day:02}  {name}");
    }
    Ok(())
}
