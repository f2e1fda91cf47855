//! Recipe service command handlers

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Local, Utc};

use gutlog_core::forms::resolve_when;
use gutlog_core::{Credentials, Journal};

use super::{future_tolerance, invalid_entry};
use crate::output::{Output, OutputFormat};
use crate::prompt::{is_interactive, prompt_line};
use crate::time::parse_when;

/// Store credentials, prompting for anything not given
pub fn login(
    journal: &mut Journal,
    username: Option<String>,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => ask("Username")?,
    };
    let password = match password.or_else(|| std::env::var("GUTLOG_RECIPE_PASSWORD").ok()) {
        Some(password) => password,
        None => ask("Password")?,
    };

    journal.set_recipe_credentials(&Credentials::new(username.trim(), password))?;
    output.success(&format!("Saved recipe login for {}", username.trim()));
    Ok(())
}

fn ask(prompt: &str) -> Result<String> {
    if !is_interactive() {
        bail!("{} required. Pass it as an option when not running in a terminal.", prompt);
    }
    match prompt_line(prompt)? {
        Some(value) => Ok(value),
        None => bail!("{} cannot be empty", prompt),
    }
}

pub fn logout(journal: &mut Journal, output: &Output) -> Result<()> {
    if journal.clear_recipe_credentials()? {
        output.success("Removed recipe login");
    } else {
        output.message("No recipe login stored.");
    }
    Ok(())
}

/// List recipes in the account
pub async fn list(journal: &Journal, output: &Output) -> Result<()> {
    let client = journal.recipe_client()?;
    let recipes = client
        .list_recipes()
        .await
        .context("Failed to list recipes")?;
    output.print_recipes(&recipes);
    Ok(())
}

/// Show a recipe and the foods its ingredients map to
pub async fn show(journal: &Journal, uid: String, output: &Output) -> Result<()> {
    let client = journal.recipe_client()?;
    let recipe = client
        .get_recipe(&uid)
        .await
        .with_context(|| format!("Failed to fetch recipe {}", uid))?;

    match output.format {
        OutputFormat::Json => output.print_json(&serde_json::json!({
            "recipe": recipe,
            "foods": recipe.ingredient_names(),
        })),
        OutputFormat::Quiet => {
            for name in recipe.ingredient_names() {
                println!("{}", name);
            }
        }
        OutputFormat::Human => {
            println!("UID:   {}", recipe.uid);
            println!("Name:  {}", recipe.name);
            if let Some(ref source) = recipe.source {
                println!("From:  {}", source);
            }
            println!();
            println!("Foods:");
            for name in recipe.ingredient_names() {
                println!("  {}", name);
            }
        }
    }
    Ok(())
}

/// Import a recipe's ingredients as foods, optionally logging them
pub async fn import(
    journal: &mut Journal,
    uid: String,
    log: bool,
    at: Option<String>,
    output: &Output,
) -> Result<()> {
    let log_at = import_time(
        at.as_deref(),
        log,
        Utc::now(),
        future_tolerance(journal.config()),
    )?;

    let client = journal.recipe_client()?;
    let recipe = client
        .get_recipe(&uid)
        .await
        .with_context(|| format!("Failed to fetch recipe {}", uid))?;

    let imported = journal.import_recipe(&recipe, log_at)?;

    match output.format {
        OutputFormat::Json => output.print_json(&imported),
        OutputFormat::Quiet => {
            if let Some(ref log) = imported.log {
                println!("{}", log.id);
            }
        }
        OutputFormat::Human => {
            let names: Vec<&str> = imported.foods.iter().map(|f| f.name.as_str()).collect();
            output.success(&format!(
                "Imported {} food(s) from '{}': {}",
                names.len(),
                recipe.name,
                names.join(", ")
            ));
            if let Some(ref log) = imported.log {
                output.success(&format!("Logged food: {}", log.id));
            }
        }
    }
    Ok(())
}

/// When to log imported foods: `--at`, now with `--log`, or not at all
fn import_time(
    at: Option<&str>,
    log: bool,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<Option<DateTime<Utc>>> {
    match at {
        Some(at) => {
            let (date, time) = parse_when(at)?;
            let ts = resolve_when(&Local, date, time, now, tolerance).map_err(invalid_entry)?;
            Ok(Some(ts))
        }
        None if log => Ok(Some(now)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_time() {
        let now = Utc::now();
        let tolerance = Duration::minutes(5);

        assert_eq!(import_time(None, false, now, tolerance).unwrap(), None);
        assert_eq!(import_time(None, true, now, tolerance).unwrap(), Some(now));

        let logged = import_time(Some("2026-01-02 12:30"), false, now, tolerance)
            .unwrap()
            .unwrap();
        assert_eq!(
            logged.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            "2026-01-02 12:30"
        );
    }

    #[test]
    fn test_import_time_rejects_future() {
        let now = Utc::now();
        let tomorrow = (Local::now() + Duration::days(1)).format("%Y-%m-%d %H:%M").to_string();

        let err = import_time(Some(&tomorrow), true, now, Duration::minutes(5)).unwrap_err();
        assert!(err.to_string().contains("Time cannot be in the future"));
    }
}
