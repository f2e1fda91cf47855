//! Journal: the main entry point
//!
//! `Journal` owns the database and configuration and exposes every operation
//! the front end needs, with error context and logging added on top of the
//! storage layer.
//!
//! ## Usage
//!
//! ```ignore
//! let mut journal = Journal::open()?;
//!
//! let mut log = FoodLog::new(Utc::now());
//! log.add_food("porridge");
//! journal.add_food_log(&log)?;
//!
//! let today = journal.day(Local::now().date_naive())?;
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{
    DrinkLog, Entry, FoodLog, Item, ItemKind, ItemUsage, MovementLog, SymptomLog,
};
use crate::range::DateRange;
use crate::recipes::{Credentials, Recipe, RecipeClient};
use crate::storage::{Database, RenameOutcome};

const RECIPE_USERNAME_KEY: &str = "recipe.username";
const RECIPE_PASSWORD_KEY: &str = "recipe.password";

/// Counts and sizes for `gutlog status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalStats {
    pub food_logs: i64,
    pub drink_logs: i64,
    pub symptom_logs: i64,
    pub movement_logs: i64,
    pub foods: i64,
    pub drinks: i64,
    pub symptoms: i64,
    pub database_path: PathBuf,
    pub database_bytes: u64,
}

/// What a recipe import created
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImport {
    /// Every ingredient as a stored food, existing or new
    pub foods: Vec<Item>,
    pub log: Option<FoodLog>,
}

/// The health journal
pub struct Journal {
    db: Database,
    config: Config,
}

impl Journal {
    /// Open the journal using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the journal with a specific configuration
    pub fn open_with_config(config: Config) -> Result<Self> {
        let db = Database::open(&config).context("Failed to open journal database")?;
        Ok(Self { db, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Food ====================

    pub fn add_food_log(&mut self, log: &FoodLog) -> Result<()> {
        self.db
            .insert_food_log(log)
            .context("Failed to add food log")?;
        info!("Added food log {} ({} food(s))", log.id, log.foods.len());
        Ok(())
    }

    pub fn update_food_log(&mut self, log: &FoodLog) -> Result<()> {
        self.db
            .update_food_log(log)
            .context("Failed to update food log")?;
        info!("Updated food log {}", log.id);
        Ok(())
    }

    pub fn delete_food_log(&mut self, id: Uuid) -> Result<()> {
        self.db
            .delete_food_log(id)
            .context("Failed to delete food log")?;
        info!("Deleted food log {}", id);
        Ok(())
    }

    pub fn get_food_log(&self, id: Uuid) -> Result<Option<FoodLog>> {
        self.db.get_food_log(id).context("Failed to get food log")
    }

    pub fn list_food_logs(&self, range: &DateRange) -> Result<Vec<FoodLog>> {
        self.db
            .get_food_logs(range)
            .context("Failed to list food logs")
    }

    /// Food logs that include a food
    pub fn food_logs_with(&self, food: &str, range: &DateRange) -> Result<Vec<FoodLog>> {
        self.db
            .get_food_logs_with(food, range)
            .with_context(|| format!("Failed to list food logs with '{}'", food))
    }

    // ==================== Drinks ====================

    pub fn add_drink_log(&mut self, log: &DrinkLog) -> Result<()> {
        self.db
            .insert_drink_log(log)
            .context("Failed to add drink log")?;
        info!("Added drink log {} ({} drink(s))", log.id, log.drinks.len());
        Ok(())
    }

    pub fn update_drink_log(&mut self, log: &DrinkLog) -> Result<()> {
        self.db
            .update_drink_log(log)
            .context("Failed to update drink log")?;
        info!("Updated drink log {}", log.id);
        Ok(())
    }

    pub fn delete_drink_log(&mut self, id: Uuid) -> Result<()> {
        self.db
            .delete_drink_log(id)
            .context("Failed to delete drink log")?;
        info!("Deleted drink log {}", id);
        Ok(())
    }

    pub fn get_drink_log(&self, id: Uuid) -> Result<Option<DrinkLog>> {
        self.db.get_drink_log(id).context("Failed to get drink log")
    }

    pub fn list_drink_logs(&self, range: &DateRange) -> Result<Vec<DrinkLog>> {
        self.db
            .get_drink_logs(range)
            .context("Failed to list drink logs")
    }

    pub fn drink_logs_with(&self, drink: &str, range: &DateRange) -> Result<Vec<DrinkLog>> {
        self.db
            .get_drink_logs_with(drink, range)
            .with_context(|| format!("Failed to list drink logs with '{}'", drink))
    }

    // ==================== Symptoms ====================

    pub fn add_symptom_log(&mut self, log: &SymptomLog) -> Result<()> {
        self.db
            .insert_symptom_log(log)
            .context("Failed to add symptom log")?;
        info!(
            "Added symptom log {} ({} symptom(s))",
            log.id,
            log.symptoms.len()
        );
        Ok(())
    }

    pub fn update_symptom_log(&mut self, log: &SymptomLog) -> Result<()> {
        self.db
            .update_symptom_log(log)
            .context("Failed to update symptom log")?;
        info!("Updated symptom log {}", log.id);
        Ok(())
    }

    pub fn delete_symptom_log(&mut self, id: Uuid) -> Result<()> {
        self.db
            .delete_symptom_log(id)
            .context("Failed to delete symptom log")?;
        info!("Deleted symptom log {}", id);
        Ok(())
    }

    pub fn get_symptom_log(&self, id: Uuid) -> Result<Option<SymptomLog>> {
        self.db
            .get_symptom_log(id)
            .context("Failed to get symptom log")
    }

    pub fn list_symptom_logs(&self, range: &DateRange) -> Result<Vec<SymptomLog>> {
        self.db
            .get_symptom_logs(range)
            .context("Failed to list symptom logs")
    }

    pub fn symptom_logs_with(&self, symptom: &str, range: &DateRange) -> Result<Vec<SymptomLog>> {
        self.db
            .get_symptom_logs_with(symptom, range)
            .with_context(|| format!("Failed to list symptom logs with '{}'", symptom))
    }

    // ==================== Movements ====================

    pub fn add_movement_log(&mut self, log: &MovementLog) -> Result<()> {
        self.db
            .insert_movement_log(log)
            .context("Failed to add movement log")?;
        info!("Added movement log {} ({})", log.id, log.stool_type);
        Ok(())
    }

    pub fn update_movement_log(&mut self, log: &MovementLog) -> Result<()> {
        self.db
            .update_movement_log(log)
            .context("Failed to update movement log")?;
        info!("Updated movement log {}", log.id);
        Ok(())
    }

    pub fn delete_movement_log(&mut self, id: Uuid) -> Result<()> {
        self.db
            .delete_movement_log(id)
            .context("Failed to delete movement log")?;
        info!("Deleted movement log {}", id);
        Ok(())
    }

    pub fn get_movement_log(&self, id: Uuid) -> Result<Option<MovementLog>> {
        self.db
            .get_movement_log(id)
            .context("Failed to get movement log")
    }

    pub fn list_movement_logs(&self, range: &DateRange) -> Result<Vec<MovementLog>> {
        self.db
            .get_movement_logs(range)
            .context("Failed to list movement logs")
    }

    // ==================== Items ====================

    /// All items of a kind, alphabetically
    pub fn items(&self, kind: ItemKind) -> Result<Vec<Item>> {
        self.db
            .list_items(kind)
            .with_context(|| format!("Failed to list {} items", kind))
    }

    /// Items with the number of logs using each, most used first
    pub fn items_with_counts(&self, kind: ItemKind) -> Result<Vec<ItemUsage>> {
        self.db
            .list_items_with_counts(kind)
            .with_context(|| format!("Failed to count {} items", kind))
    }

    /// Items whose name contains `query`, prefix matches first
    pub fn search_items(&self, kind: ItemKind, query: &str) -> Result<Vec<Item>> {
        let query = query.trim().to_lowercase();
        let mut matches: Vec<Item> = self
            .items(kind)?
            .into_iter()
            .filter(|item| item.name.to_lowercase().contains(&query))
            .collect();
        matches.sort_by_key(|item| !item.name.to_lowercase().starts_with(&query));
        Ok(matches)
    }

    pub fn rename_item(
        &mut self,
        kind: ItemKind,
        old_name: &str,
        new_name: &str,
    ) -> Result<RenameOutcome> {
        self.db
            .rename_item(kind, old_name, new_name)
            .with_context(|| format!("Failed to rename {} '{}'", kind, old_name))
    }

    /// Merge `duplicate` into `canonical`; returns how many logs referenced the duplicate
    pub fn merge_items(&mut self, kind: ItemKind, duplicate: &str, canonical: &str) -> Result<usize> {
        self.db
            .merge_items(kind, duplicate, canonical)
            .with_context(|| {
                format!(
                    "Failed to merge {} '{}' into '{}'",
                    kind, duplicate, canonical
                )
            })
    }

    pub fn delete_item(&mut self, kind: ItemKind, name: &str) -> Result<Item> {
        self.db
            .delete_item(kind, name)
            .with_context(|| format!("Failed to delete {} '{}'", kind, name))
    }

    /// Delete unused items of a kind; returns how many were removed
    pub fn prune_items(&mut self, kind: ItemKind) -> Result<usize> {
        self.db
            .prune_unused_items(kind)
            .with_context(|| format!("Failed to prune {} items", kind))
    }

    // ==================== Timeline ====================

    /// Every entry on a local calendar day, oldest first
    pub fn day(&self, date: NaiveDate) -> Result<Vec<Entry>> {
        self.entries(&DateRange::day(date))
    }

    /// Every entry in a range, oldest first
    pub fn entries(&self, range: &DateRange) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = Vec::new();
        entries.extend(self.list_food_logs(range)?.into_iter().map(Entry::Food));
        entries.extend(self.list_drink_logs(range)?.into_iter().map(Entry::Drink));
        entries.extend(
            self.list_symptom_logs(range)?
                .into_iter()
                .map(Entry::Symptom),
        );
        entries.extend(
            self.list_movement_logs(range)?
                .into_iter()
                .map(Entry::Movement),
        );

        entries.sort_by_key(|entry| entry.logged_at());
        debug!("Timeline has {} entries", entries.len());
        Ok(entries)
    }

    // ==================== Stats ====================

    pub fn stats(&self) -> Result<JournalStats> {
        let database_path = self.config.sqlite_path();
        let database_bytes = match std::fs::metadata(&database_path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!("Could not read database size at {:?}: {}", database_path, e);
                0
            }
        };

        Ok(JournalStats {
            food_logs: self.db.food_log_count().context("Failed to count food logs")?,
            drink_logs: self
                .db
                .drink_log_count()
                .context("Failed to count drink logs")?,
            symptom_logs: self
                .db
                .symptom_log_count()
                .context("Failed to count symptom logs")?,
            movement_logs: self
                .db
                .movement_log_count()
                .context("Failed to count movement logs")?,
            foods: self.item_count(ItemKind::Food)?,
            drinks: self.item_count(ItemKind::Drink)?,
            symptoms: self.item_count(ItemKind::Symptom)?,
            database_path,
            database_bytes,
        })
    }

    fn item_count(&self, kind: ItemKind) -> Result<i64> {
        self.db
            .item_count(kind)
            .with_context(|| format!("Failed to count {} items", kind))
    }

    // ==================== Recipes ====================

    /// Stored recipe service credentials, if any
    pub fn recipe_credentials(&self) -> Result<Option<Credentials>> {
        let username = self
            .db
            .get_setting(RECIPE_USERNAME_KEY)
            .context("Failed to read recipe username")?;
        let password = self
            .db
            .get_setting(RECIPE_PASSWORD_KEY)
            .context("Failed to read recipe password")?;

        Ok(match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        })
    }

    pub fn set_recipe_credentials(&mut self, credentials: &Credentials) -> Result<()> {
        if credentials.username.trim().is_empty() {
            bail!("Recipe service username cannot be empty");
        }
        self.db
            .set_setting(RECIPE_USERNAME_KEY, credentials.username.trim())
            .context("Failed to save recipe username")?;
        self.db
            .set_setting(RECIPE_PASSWORD_KEY, &credentials.password)
            .context("Failed to save recipe password")?;
        info!("Saved recipe credentials for {}", credentials.username.trim());
        Ok(())
    }

    /// Forget the stored credentials; returns whether any were stored
    pub fn clear_recipe_credentials(&mut self) -> Result<bool> {
        let had_username = self
            .db
            .delete_setting(RECIPE_USERNAME_KEY)
            .context("Failed to clear recipe username")?;
        let had_password = self
            .db
            .delete_setting(RECIPE_PASSWORD_KEY)
            .context("Failed to clear recipe password")?;
        Ok(had_username || had_password)
    }

    /// A client for the configured recipe service using the stored credentials
    pub fn recipe_client(&self) -> Result<RecipeClient> {
        let credentials = self.recipe_credentials()?;
        let client = RecipeClient::new(&self.config.recipe_base_url, credentials)?;
        Ok(client)
    }

    /// Store a recipe's ingredients as foods, optionally logging them at `log_at`
    pub fn import_recipe(
        &mut self,
        recipe: &Recipe,
        log_at: Option<DateTime<Utc>>,
    ) -> Result<RecipeImport> {
        let names = recipe.ingredient_names();
        if names.is_empty() {
            bail!("Recipe '{}' has no ingredients to import", recipe.name);
        }

        let mut log = log_at.map(|logged_at| {
            let mut log = FoodLog::new(logged_at);
            log.set_foods(names.clone());
            log.set_note(Some(recipe.name.clone()));
            log
        });

        let foods = self
            .db
            .import_foods(&names, log.as_ref())
            .with_context(|| format!("Failed to import recipe '{}'", recipe.name))?;
        // Existing foods keep their stored spelling, as a reload would show
        if let Some(log) = log.as_mut() {
            log.foods = foods.iter().map(|f| f.name.clone()).collect();
        }

        info!(
            "Imported {} ingredient(s) from recipe '{}'",
            foods.len(),
            recipe.name
        );
        Ok(RecipeImport { foods, log })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, StoolType};
    use chrono::{Duration, Local, TimeZone};
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    fn local(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        Local
            .from_local_datetime(&date.and_hms_opt(h, m, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_open_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let journal = Journal::open_with_config(config.clone()).unwrap();
        assert!(config.sqlite_path().exists());
        assert_eq!(journal.stats().unwrap().food_logs, 0);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let mut log = FoodLog::new(Utc::now() - Duration::hours(1));
        log.add_food("oats");
        {
            let mut journal = Journal::open_with_config(config.clone()).unwrap();
            journal.add_food_log(&log).unwrap();
        }

        let journal = Journal::open_with_config(config).unwrap();
        let stored = journal.get_food_log(log.id).unwrap().unwrap();
        assert_eq!(stored.foods, vec!["oats"]);
    }

    #[test]
    fn test_day_merges_families_in_time_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::open_with_config(test_config(&temp_dir)).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();

        let mut food = FoodLog::new(local(date, 12, 0));
        food.add_food("sandwich");
        let mut drink = DrinkLog::new(local(date, 8, 0));
        drink.add_drink("coffee");
        let mut symptom = SymptomLog::new(local(date, 14, 30));
        symptom.add_symptom("bloating", Severity::Moderate);
        let movement = MovementLog::new(local(date, 9, 15), StoolType::new(4).unwrap());
        let mut next_day = FoodLog::new(local(date, 23, 59) + Duration::minutes(2));
        next_day.add_food("toast");

        journal.add_food_log(&food).unwrap();
        journal.add_drink_log(&drink).unwrap();
        journal.add_symptom_log(&symptom).unwrap();
        journal.add_movement_log(&movement).unwrap();
        journal.add_food_log(&next_day).unwrap();

        let entries = journal.day(date).unwrap();
        let labels: Vec<_> = entries.iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["drink", "movement", "food", "symptom"]);
        assert_eq!(entries[2].id(), food.id);
    }

    #[test]
    fn test_search_items_prefix_first() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::open_with_config(test_config(&temp_dir)).unwrap();

        let mut log = FoodLog::new(Utc::now());
        for food in ["Pineapple", "Apple", "Bread", "apple juice"] {
            log.add_food(food);
        }
        journal.add_food_log(&log).unwrap();

        let names: Vec<_> = journal
            .search_items(ItemKind::Food, "apple")
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Apple", "apple juice", "Pineapple"]);
    }

    #[test]
    fn test_merge_through_journal() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::open_with_config(test_config(&temp_dir)).unwrap();

        let mut a = DrinkLog::new(Utc::now() - Duration::hours(2));
        a.add_drink("OJ");
        let mut b = DrinkLog::new(Utc::now() - Duration::hours(1));
        b.add_drink("orange juice");
        journal.add_drink_log(&a).unwrap();
        journal.add_drink_log(&b).unwrap();

        assert_eq!(
            journal
                .merge_items(ItemKind::Drink, "oj", "Orange Juice")
                .unwrap(),
            1
        );
        let stored = journal.get_drink_log(a.id).unwrap().unwrap();
        assert_eq!(stored.drinks, vec!["orange juice"]);
        assert_eq!(journal.items(ItemKind::Drink).unwrap().len(), 1);

        let err = journal
            .merge_items(ItemKind::Drink, "oj", "orange juice")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to merge drink 'oj'"));
    }

    #[test]
    fn test_stats() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::open_with_config(test_config(&temp_dir)).unwrap();

        let mut symptom = SymptomLog::new(Utc::now());
        symptom.add_symptom("gas", Severity::Mild);
        symptom.add_symptom("cramps", Severity::Severe);
        journal.add_symptom_log(&symptom).unwrap();
        journal
            .add_movement_log(&MovementLog::new(Utc::now(), StoolType::new(3).unwrap()))
            .unwrap();

        let stats = journal.stats().unwrap();
        assert_eq!(stats.symptom_logs, 1);
        assert_eq!(stats.movement_logs, 1);
        assert_eq!(stats.symptoms, 2);
        assert_eq!(stats.foods, 0);
        assert!(stats.database_bytes > 0);
    }

    #[test]
    fn test_recipe_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::open_with_config(test_config(&temp_dir)).unwrap();

        assert!(journal.recipe_credentials().unwrap().is_none());
        assert!(journal.recipe_client().is_err());

        let creds = Credentials::new(" cook@example.com ", "s3cret");
        journal.set_recipe_credentials(&creds).unwrap();
        assert_eq!(
            journal.recipe_credentials().unwrap(),
            Some(Credentials::new("cook@example.com", "s3cret"))
        );
        assert!(journal.recipe_client().is_ok());

        assert!(journal.clear_recipe_credentials().unwrap());
        assert!(!journal.clear_recipe_credentials().unwrap());
        assert!(journal
            .set_recipe_credentials(&Credentials::new("  ", "x"))
            .is_err());
    }

    #[test]
    fn test_import_recipe() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::open_with_config(test_config(&temp_dir)).unwrap();

        // An existing item keeps its stored spelling
        let mut earlier = FoodLog::new(Utc::now() - Duration::days(1));
        earlier.add_food("Eggs");
        journal.add_food_log(&earlier).unwrap();

        let recipe = Recipe {
            uid: "P1".to_string(),
            name: "Pancakes".to_string(),
            ingredients: Some("1 cup flour\n2 eggs\n1 cup milk".to_string()),
            servings: None,
            source: None,
        };

        let imported = journal.import_recipe(&recipe, None).unwrap();
        let names: Vec<_> = imported.foods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["flour", "Eggs", "milk"]);
        assert!(imported.log.is_none());
        assert_eq!(journal.stats().unwrap().food_logs, 1);

        let logged_at = Utc::now() - Duration::minutes(10);
        let imported = journal.import_recipe(&recipe, Some(logged_at)).unwrap();
        let log = imported.log.unwrap();
        assert_eq!(log.foods, vec!["flour", "Eggs", "milk"]);
        assert_eq!(log.note.as_deref(), Some("Pancakes"));
        assert!(journal.get_food_log(log.id).unwrap().is_some());
        assert_eq!(journal.items(ItemKind::Food).unwrap().len(), 3);
    }

    #[test]
    fn test_import_recipe_without_ingredients() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::open_with_config(test_config(&temp_dir)).unwrap();
        let recipe = Recipe {
            uid: "E".to_string(),
            name: "Water".to_string(),
            ingredients: None,
            servings: None,
            source: None,
        };
        assert!(journal.import_recipe(&recipe, None).is_err());
    }
}
