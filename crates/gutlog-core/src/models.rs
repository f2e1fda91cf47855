//! Data models for gutlog
//!
//! Defines the journal records (food, drink, symptom and movement logs) and
//! the reusable named items they reference.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of an item name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Errors from parsing model values out of user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown item kind '{0}'. Expected one of: food, drink, symptom")]
    ItemKind(String),

    #[error("Unknown severity '{0}'. Expected one of: mild, moderate, severe (or 1-3)")]
    Severity(String),

    #[error("Invalid stool type '{0}'. Expected a Bristol scale value from 1 to 7")]
    StoolType(String),
}

/// Family of reusable, named items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Food,
    Drink,
    Symptom,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Food, ItemKind::Drink, ItemKind::Symptom];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Food => "food",
            ItemKind::Drink => "drink",
            ItemKind::Symptom => "symptom",
        }
    }

    pub(crate) fn item_table(&self) -> &'static str {
        match self {
            ItemKind::Food => "food_items",
            ItemKind::Drink => "drink_items",
            ItemKind::Symptom => "symptoms",
        }
    }

    pub(crate) fn join_table(&self) -> &'static str {
        match self {
            ItemKind::Food => "food_log_items",
            ItemKind::Drink => "drink_log_items",
            ItemKind::Symptom => "symptom_log_entries",
        }
    }

    pub(crate) fn join_log_column(&self) -> &'static str {
        match self {
            ItemKind::Food => "food_log_id",
            ItemKind::Drink => "drink_log_id",
            ItemKind::Symptom => "symptom_log_id",
        }
    }

    pub(crate) fn join_item_column(&self) -> &'static str {
        match self {
            ItemKind::Food => "food_item_id",
            ItemKind::Drink => "drink_item_id",
            ItemKind::Symptom => "symptom_id",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "food" | "foods" => Ok(ItemKind::Food),
            "drink" | "drinks" => Ok(ItemKind::Drink),
            "symptom" | "symptoms" => Ok(ItemKind::Symptom),
            _ => Err(ParseError::ItemKind(s.to_string())),
        }
    }
}

/// A reusable named item (a food, a drink or a symptom)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub name: String,
}

/// An item together with the number of logs referencing it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemUsage {
    pub id: i64,
    pub name: String,
    pub log_count: i64,
}

/// How bad a symptom was
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Ordinal stored in the database (1-3)
    pub fn ordinal(&self) -> i64 {
        match self {
            Severity::Mild => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
        }
    }

    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            1 => Some(Severity::Mild),
            2 => Some(Severity::Moderate),
            3 => Some(Severity::Severe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Mild
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" | "1" => Ok(Severity::Mild),
            "moderate" | "2" => Ok(Severity::Moderate),
            "severe" | "3" => Ok(Severity::Severe),
            _ => Err(ParseError::Severity(s.to_string())),
        }
    }
}

/// Bristol stool scale classification (1-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StoolType(u8);

impl StoolType {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;

    pub fn new(value: u8) -> Result<Self, ParseError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParseError::StoolType(value.to_string()))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Short description of the scale value
    pub fn description(&self) -> &'static str {
        match self.0 {
            1 => "Separate hard lumps",
            2 => "Lumpy and sausage-like",
            3 => "Sausage shape with cracks",
            4 => "Smooth, soft sausage",
            5 => "Soft blobs with clear-cut edges",
            6 => "Mushy with ragged edges",
            _ => "Watery, no solid pieces",
        }
    }
}

impl TryFrom<u8> for StoolType {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StoolType> for u8 {
    fn from(value: StoolType) -> Self {
        value.0
    }
}

impl fmt::Display for StoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type {} ({})", self.0, self.description())
    }
}

impl FromStr for StoolType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("type")
            .or_else(|| trimmed.strip_prefix("Type"))
            .unwrap_or(trimmed)
            .trim();
        digits
            .parse::<u8>()
            .ok()
            .and_then(|v| Self::new(v).ok())
            .ok_or_else(|| ParseError::StoolType(s.to_string()))
    }
}

/// Trim an item name and collapse inner whitespace.
///
/// Returns `None` for names that are empty after trimming.
pub fn normalize_name(name: &str) -> Option<String> {
    let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn position_of(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n.eq_ignore_ascii_case(name))
}

/// A meal or snack: what was eaten, and when
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodLog {
    pub id: Uuid,
    /// When the food was eaten
    pub logged_at: DateTime<Utc>,
    pub foods: Vec<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodLog {
    pub fn new(logged_at: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), logged_at)
    }

    /// Create a log with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, logged_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id,
            logged_at,
            foods: Vec::new(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_logged_at(&mut self, logged_at: DateTime<Utc>) {
        self.logged_at = logged_at;
        self.updated_at = Utc::now();
    }

    /// Add a food; names already present (ignoring case) are skipped
    pub fn add_food(&mut self, name: &str) {
        if let Some(name) = normalize_name(name) {
            if position_of(&self.foods, &name).is_none() {
                self.foods.push(name);
                self.updated_at = Utc::now();
            }
        }
    }

    pub fn remove_food(&mut self, name: &str) {
        if let Some(pos) = position_of(&self.foods, name.trim()) {
            self.foods.remove(pos);
            self.updated_at = Utc::now();
        }
    }

    /// Replace all foods
    pub fn set_foods(&mut self, foods: Vec<String>) {
        self.foods.clear();
        for food in foods {
            self.add_food(&food);
        }
        self.updated_at = Utc::now();
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.trim().is_empty());
        self.updated_at = Utc::now();
    }
}

/// Something drunk, and when
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrinkLog {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub drinks: Vec<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DrinkLog {
    pub fn new(logged_at: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), logged_at)
    }

    pub fn with_id(id: Uuid, logged_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id,
            logged_at,
            drinks: Vec::new(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_logged_at(&mut self, logged_at: DateTime<Utc>) {
        self.logged_at = logged_at;
        self.updated_at = Utc::now();
    }

    pub fn add_drink(&mut self, name: &str) {
        if let Some(name) = normalize_name(name) {
            if position_of(&self.drinks, &name).is_none() {
                self.drinks.push(name);
                self.updated_at = Utc::now();
            }
        }
    }

    pub fn remove_drink(&mut self, name: &str) {
        if let Some(pos) = position_of(&self.drinks, name.trim()) {
            self.drinks.remove(pos);
            self.updated_at = Utc::now();
        }
    }

    pub fn set_drinks(&mut self, drinks: Vec<String>) {
        self.drinks.clear();
        for drink in drinks {
            self.add_drink(&drink);
        }
        self.updated_at = Utc::now();
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.trim().is_empty());
        self.updated_at = Utc::now();
    }
}

/// One symptom within a symptom log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomEntry {
    pub name: String,
    pub severity: Severity,
}

impl SymptomEntry {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }
}

/// Symptoms felt at a point in time, each with a severity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomLog {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub symptoms: Vec<SymptomEntry>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SymptomLog {
    pub fn new(logged_at: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), logged_at)
    }

    pub fn with_id(id: Uuid, logged_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id,
            logged_at,
            symptoms: Vec::new(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_logged_at(&mut self, logged_at: DateTime<Utc>) {
        self.logged_at = logged_at;
        self.updated_at = Utc::now();
    }

    /// Add a symptom, or update the severity if it is already present
    pub fn add_symptom(&mut self, name: &str, severity: Severity) {
        let Some(name) = normalize_name(name) else {
            return;
        };
        match self
            .symptoms
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.severity = severity,
            None => self.symptoms.push(SymptomEntry::new(name, severity)),
        }
        self.updated_at = Utc::now();
    }

    pub fn remove_symptom(&mut self, name: &str) {
        let name = name.trim();
        if let Some(pos) = self
            .symptoms
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            self.symptoms.remove(pos);
            self.updated_at = Utc::now();
        }
    }

    pub fn set_symptoms(&mut self, symptoms: Vec<SymptomEntry>) {
        self.symptoms.clear();
        for entry in symptoms {
            self.add_symptom(&entry.name, entry.severity);
        }
        self.updated_at = Utc::now();
    }

    /// Highest severity in this log
    pub fn max_severity(&self) -> Option<Severity> {
        self.symptoms.iter().map(|s| s.severity).max()
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.trim().is_empty());
        self.updated_at = Utc::now();
    }
}

/// A bowel movement observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementLog {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub stool_type: StoolType,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovementLog {
    pub fn new(logged_at: DateTime<Utc>, stool_type: StoolType) -> Self {
        Self::with_id(Uuid::new_v4(), logged_at, stool_type)
    }

    pub fn with_id(id: Uuid, logged_at: DateTime<Utc>, stool_type: StoolType) -> Self {
        let now = Utc::now();
        Self {
            id,
            logged_at,
            stool_type,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_logged_at(&mut self, logged_at: DateTime<Utc>) {
        self.logged_at = logged_at;
        self.updated_at = Utc::now();
    }

    pub fn set_stool_type(&mut self, stool_type: StoolType) {
        self.stool_type = stool_type;
        self.updated_at = Utc::now();
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.trim().is_empty());
        self.updated_at = Utc::now();
    }
}

/// Any journal record, for mixed timelines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Food(FoodLog),
    Drink(DrinkLog),
    Symptom(SymptomLog),
    Movement(MovementLog),
}

impl Entry {
    pub fn id(&self) -> Uuid {
        match self {
            Entry::Food(log) => log.id,
            Entry::Drink(log) => log.id,
            Entry::Symptom(log) => log.id,
            Entry::Movement(log) => log.id,
        }
    }

    pub fn logged_at(&self) -> DateTime<Utc> {
        match self {
            Entry::Food(log) => log.logged_at,
            Entry::Drink(log) => log.logged_at,
            Entry::Symptom(log) => log.logged_at,
            Entry::Movement(log) => log.logged_at,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Entry::Food(_) => "food",
            Entry::Drink(_) => "drink",
            Entry::Symptom(_) => "symptom",
            Entry::Movement(_) => "movement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_parse() {
        assert_eq!("food".parse::<ItemKind>().unwrap(), ItemKind::Food);
        assert_eq!("Drinks".parse::<ItemKind>().unwrap(), ItemKind::Drink);
        assert_eq!(" symptom ".parse::<ItemKind>().unwrap(), ItemKind::Symptom);
        assert!(matches!(
            "snack".parse::<ItemKind>(),
            Err(ParseError::ItemKind(_))
        ));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Mild < Severity::Moderate);
        assert!(Severity::Moderate < Severity::Severe);
        assert_eq!(Severity::default(), Severity::Mild);
    }

    #[test]
    fn test_severity_parse_and_ordinal() {
        assert_eq!("Moderate".parse::<Severity>().unwrap(), Severity::Moderate);
        assert_eq!("3".parse::<Severity>().unwrap(), Severity::Severe);
        assert!("awful".parse::<Severity>().is_err());

        for severity in [Severity::Mild, Severity::Moderate, Severity::Severe] {
            assert_eq!(Severity::from_ordinal(severity.ordinal()), Some(severity));
        }
        assert_eq!(Severity::from_ordinal(0), None);
    }

    #[test]
    fn test_stool_type_range() {
        assert!(StoolType::new(0).is_err());
        assert!(StoolType::new(8).is_err());
        assert_eq!(StoolType::new(4).unwrap().value(), 4);
        assert_eq!("type 6".parse::<StoolType>().unwrap().value(), 6);
        assert!("soft".parse::<StoolType>().is_err());
    }

    #[test]
    fn test_stool_type_deserialize_rejects_out_of_range() {
        let ok: StoolType = serde_json::from_str("5").unwrap();
        assert_eq!(ok.value(), 5);
        assert!(serde_json::from_str::<StoolType>("9").is_err());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  green   tea "), Some("green tea".to_string()));
        assert_eq!(normalize_name("   "), None);
    }

    #[test]
    fn test_food_log_add_is_case_insensitive() {
        let mut log = FoodLog::new(Utc::now());
        log.add_food("Eggs");
        log.add_food("eggs");
        log.add_food(" toast ");
        log.add_food("");
        assert_eq!(log.foods, vec!["Eggs", "toast"]);

        log.remove_food("EGGS");
        assert_eq!(log.foods, vec!["toast"]);
    }

    #[test]
    fn test_food_log_set_foods_dedupes() {
        let mut log = FoodLog::new(Utc::now());
        log.set_foods(vec!["rice".into(), "Rice".into(), "beans".into()]);
        assert_eq!(log.foods, vec!["rice", "beans"]);
    }

    #[test]
    fn test_log_mutation_bumps_updated_at() {
        let mut log = DrinkLog::new(Utc::now());
        let original = log.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(10));
        log.add_drink("coffee");
        assert!(log.updated_at > original);
    }

    #[test]
    fn test_symptom_log_updates_existing_severity() {
        let mut log = SymptomLog::new(Utc::now());
        log.add_symptom("Bloating", Severity::Mild);
        log.add_symptom("bloating", Severity::Severe);
        log.add_symptom("Cramps", Severity::Moderate);

        assert_eq!(log.symptoms.len(), 2);
        assert_eq!(log.symptoms[0].name, "Bloating");
        assert_eq!(log.symptoms[0].severity, Severity::Severe);
        assert_eq!(log.max_severity(), Some(Severity::Severe));

        log.remove_symptom("bloating");
        assert_eq!(log.max_severity(), Some(Severity::Moderate));
    }

    #[test]
    fn test_blank_note_is_cleared() {
        let mut log = MovementLog::new(Utc::now(), StoolType::new(4).unwrap());
        log.set_note(Some("   ".to_string()));
        assert!(log.note.is_none());
        log.set_note(Some("after coffee".to_string()));
        assert_eq!(log.note.as_deref(), Some("after coffee"));
    }

    #[test]
    fn test_entry_serialization_is_tagged() {
        let log = MovementLog::new(Utc::now(), StoolType::new(3).unwrap());
        let entry = Entry::Movement(log.clone());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "movement");
        assert_eq!(json["stool_type"], 3);

        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), log.id);
        assert_eq!(back.label(), "movement");
    }
}
