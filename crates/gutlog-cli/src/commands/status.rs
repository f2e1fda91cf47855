//! Status command handler

use anyhow::Result;

use gutlog_core::Journal;

use crate::output::{Output, OutputFormat};

/// Show counts and storage information
pub fn show(journal: &Journal, output: &Output) -> Result<()> {
    let stats = journal.stats()?;
    output.print_stats(&stats);

    if output.format == OutputFormat::Human {
        let logged_in = journal.recipe_credentials()?.is_some();
        println!();
        println!("Recipes:");
        println!("  Service: {}", journal.config().recipe_base_url);
        println!(
            "  Login:   {}",
            if logged_in { "configured" } else { "(not set)" }
        );
    }

    Ok(())
}
