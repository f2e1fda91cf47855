//! Day view: every entry on one local calendar day

use anyhow::Result;
use chrono::Local;

use gutlog_core::Journal;

use crate::output::{Output, OutputFormat};
use crate::time::parse_date;

pub fn show(journal: &Journal, date: Option<String>, output: &Output) -> Result<()> {
    let date = match date {
        Some(ref date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };

    let entries = journal.day(date)?;
    if output.format == OutputFormat::Human {
        println!("{}", date.format("%A %Y-%m-%d"));
        println!();
    }
    output.print_entries(&entries);
    Ok(())
}
