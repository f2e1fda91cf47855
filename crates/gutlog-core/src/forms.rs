//! Entry form state
//!
//! Forms collect user input for a new or edited log, independently of any
//! front end. Input arrives as [`FormIntent`]s; `validate` turns the current
//! state into a log or a set of per-field errors.
//!
//! ```ignore
//! let mut form = FoodLogForm::new();
//! form.apply(FormIntent::SetSearch("ban".into()));
//! let choices = form.suggestions(known.iter().map(|i| i.name.as_str()));
//! form.apply(FormIntent::Select(choices[0].to_string()));
//! let log = form.validate()?;
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::config::DEFAULT_FUTURE_TOLERANCE_MINUTES;
use crate::models::{
    normalize_name, DrinkLog, FoodLog, ItemKind, MovementLog, Severity, StoolType, SymptomEntry,
    SymptomLog, MAX_NAME_LEN,
};

/// Maximum note length in characters
pub const MAX_NOTE_LEN: usize = 1000;

/// A single user action on a form
///
/// Intents that do not apply to a form (a severity on a food form, say) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    SetSearch(String),
    Select(String),
    Deselect(String),
    SetSeverity(String, Severity),
    SetStoolType(StoolType),
    SetDate(NaiveDate),
    SetTime(NaiveTime),
    SetNote(String),
}

/// Validation messages, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    /// Selected items, or the stool type for movements
    pub items: Option<String>,
    /// Date and time
    pub when: Option<String>,
    pub note: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.items.is_none() && self.when.is_none() && self.note.is_none()
    }

    pub fn messages(&self) -> Vec<&str> {
        [&self.items, &self.when, &self.note]
            .into_iter()
            .filter_map(|m| m.as_deref())
            .collect()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Convert a date and time in `tz` to UTC
///
/// Returns `None` when the time falls in a DST gap. Ambiguous times resolve
/// to the earlier instant.
pub fn timestamp_in<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Convert a local date and time to UTC
pub fn local_timestamp(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    timestamp_in(&Local, date, time)
}

/// Resolve a date and time in `tz` to a log timestamp
///
/// Fails with a `when` error if the time does not exist in `tz` or lies more
/// than `tolerance` after `now`.
pub fn resolve_when<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<DateTime<Utc>, FormErrors> {
    let Some(ts) = timestamp_in(tz, date, time) else {
        return Err(FormErrors {
            when: Some(format!(
                "{} {} does not exist in the local time zone",
                date,
                time.format("%H:%M")
            )),
            ..FormErrors::default()
        });
    };
    not_in_future(ts, now, tolerance)
}

fn not_in_future(
    ts: DateTime<Utc>,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<DateTime<Utc>, FormErrors> {
    if ts > now + tolerance {
        return Err(FormErrors {
            when: Some("Time cannot be in the future".to_string()),
            ..FormErrors::default()
        });
    }
    Ok(ts)
}

// ==================== Shared state ====================

/// Date, time and note handling common to every form
#[derive(Debug, Clone)]
struct When {
    date: NaiveDate,
    time: NaiveTime,
    note: String,
    tolerance: Duration,
    /// Timestamp of the log being edited, with the local date/time it was seeded as
    seeded: Option<(DateTime<Utc>, NaiveDate, NaiveTime)>,
}

impl When {
    fn now() -> Self {
        let now = Local::now();
        Self {
            date: now.date_naive(),
            time: now.time(),
            note: String::new(),
            tolerance: Duration::minutes(DEFAULT_FUTURE_TOLERANCE_MINUTES),
            seeded: None,
        }
    }

    fn from_log(logged_at: DateTime<Utc>, note: Option<&str>) -> Self {
        let local = logged_at.with_timezone(&Local);
        Self {
            date: local.date_naive(),
            time: local.time(),
            note: note.unwrap_or_default().to_string(),
            tolerance: Duration::minutes(DEFAULT_FUTURE_TOLERANCE_MINUTES),
            seeded: Some((logged_at, local.date_naive(), local.time())),
        }
    }

    /// Handle the intents every form shares; returns false for the rest
    fn apply(&mut self, intent: &FormIntent) -> bool {
        match intent {
            FormIntent::SetDate(date) => self.date = *date,
            FormIntent::SetTime(time) => self.time = *time,
            FormIntent::SetNote(note) => self.note = note.clone(),
            _ => return false,
        }
        true
    }

    fn logged_at(&self, now: DateTime<Utc>, errors: &mut FormErrors) -> Option<DateTime<Utc>> {
        // An untouched date/time keeps the original instant, even across a DST fold
        let resolved = match self.seeded {
            Some((ts, date, time)) if date == self.date && time == self.time => {
                not_in_future(ts, now, self.tolerance)
            }
            _ => resolve_when(&Local, self.date, self.time, now, self.tolerance),
        };

        match resolved {
            Ok(ts) => Some(ts),
            Err(e) => {
                errors.when = e.when;
                None
            }
        }
    }

    fn note(&self, errors: &mut FormErrors) -> Option<String> {
        let note = self.note.trim();
        if note.chars().count() > MAX_NOTE_LEN {
            errors.note = Some(format!(
                "Note must be at most {} characters",
                MAX_NOTE_LEN
            ));
            return None;
        }
        (!note.is_empty()).then(|| note.to_string())
    }
}

fn check_names<'a>(
    kind: ItemKind,
    names: impl IntoIterator<Item = &'a str>,
    errors: &mut FormErrors,
) {
    let mut names = names.into_iter().peekable();
    if names.peek().is_none() {
        errors.items = Some(format!("Select at least one {}", kind));
        return;
    }
    if let Some(long) = names.find(|n| n.chars().count() > MAX_NAME_LEN) {
        errors.items = Some(format!(
            "'{}' is too long: {} names must be at most {} characters",
            long, kind, MAX_NAME_LEN
        ));
    }
}

/// Known names matching the search, prefix matches first, minus the selected ones
fn filter_suggestions<'a>(
    search: &str,
    known: impl IntoIterator<Item = &'a str>,
    is_selected: impl Fn(&str) -> bool,
) -> Vec<&'a str> {
    let query = search.trim().to_lowercase();
    let (mut prefix, mut substring): (Vec<&str>, Vec<&str>) = (Vec::new(), Vec::new());

    for name in known {
        if is_selected(name) {
            continue;
        }
        let lower = name.to_lowercase();
        if lower.starts_with(&query) {
            prefix.push(name);
        } else if lower.contains(&query) {
            substring.push(name);
        }
    }

    prefix.extend(substring);
    prefix
}

fn contains_name(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

// ==================== Food and drink ====================

/// A log made of a list of item names (food, drink)
pub trait ItemLog: Clone {
    const KIND: ItemKind;

    fn create(logged_at: DateTime<Utc>) -> Self;
    fn logged_at(&self) -> DateTime<Utc>;
    fn item_names(&self) -> &[String];
    fn note(&self) -> Option<&str>;
    fn set_logged_at(&mut self, logged_at: DateTime<Utc>);
    fn set_item_names(&mut self, names: Vec<String>);
    fn set_note(&mut self, note: Option<String>);
}

impl ItemLog for FoodLog {
    const KIND: ItemKind = ItemKind::Food;

    fn create(logged_at: DateTime<Utc>) -> Self {
        FoodLog::new(logged_at)
    }
    fn logged_at(&self) -> DateTime<Utc> {
        self.logged_at
    }
    fn item_names(&self) -> &[String] {
        &self.foods
    }
    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
    fn set_logged_at(&mut self, logged_at: DateTime<Utc>) {
        FoodLog::set_logged_at(self, logged_at)
    }
    fn set_item_names(&mut self, names: Vec<String>) {
        self.set_foods(names)
    }
    fn set_note(&mut self, note: Option<String>) {
        FoodLog::set_note(self, note)
    }
}

impl ItemLog for DrinkLog {
    const KIND: ItemKind = ItemKind::Drink;

    fn create(logged_at: DateTime<Utc>) -> Self {
        DrinkLog::new(logged_at)
    }
    fn logged_at(&self) -> DateTime<Utc> {
        self.logged_at
    }
    fn item_names(&self) -> &[String] {
        &self.drinks
    }
    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
    fn set_logged_at(&mut self, logged_at: DateTime<Utc>) {
        DrinkLog::set_logged_at(self, logged_at)
    }
    fn set_item_names(&mut self, names: Vec<String>) {
        self.set_drinks(names)
    }
    fn set_note(&mut self, note: Option<String>) {
        DrinkLog::set_note(self, note)
    }
}

/// Form for food and drink logs
#[derive(Debug, Clone)]
pub struct ItemLogForm<L: ItemLog> {
    search: String,
    selected: Vec<String>,
    when: When,
    errors: FormErrors,
    existing: Option<L>,
}

pub type FoodLogForm = ItemLogForm<FoodLog>;
pub type DrinkLogForm = ItemLogForm<DrinkLog>;

impl<L: ItemLog> Default for ItemLogForm<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ItemLog> ItemLogForm<L> {
    /// An empty form timed at now
    pub fn new() -> Self {
        Self {
            search: String::new(),
            selected: Vec::new(),
            when: When::now(),
            errors: FormErrors::default(),
            existing: None,
        }
    }

    /// A form for editing an existing log
    pub fn from_log(log: &L) -> Self {
        Self {
            search: String::new(),
            selected: log.item_names().to_vec(),
            when: When::from_log(log.logged_at(), log.note()),
            errors: FormErrors::default(),
            existing: Some(log.clone()),
        }
    }

    pub fn kind(&self) -> ItemKind {
        L::KIND
    }

    pub fn is_editing(&self) -> bool {
        self.existing.is_some()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn date(&self) -> NaiveDate {
        self.when.date
    }

    pub fn time(&self) -> NaiveTime {
        self.when.time
    }

    pub fn note(&self) -> &str {
        &self.when.note
    }

    /// Errors from the last `validate` call
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn set_future_tolerance(&mut self, tolerance: Duration) {
        self.when.tolerance = tolerance;
    }

    pub fn apply(&mut self, intent: FormIntent) {
        if self.when.apply(&intent) {
            return;
        }
        match intent {
            FormIntent::SetSearch(search) => self.search = search,
            FormIntent::Select(name) => {
                if let Some(name) = normalize_name(&name) {
                    if !contains_name(&self.selected, &name) {
                        self.selected.push(name);
                    }
                    self.search.clear();
                }
            }
            FormIntent::Deselect(name) => {
                let name = name.trim();
                self.selected.retain(|n| !n.eq_ignore_ascii_case(name));
            }
            _ => {}
        }
    }

    pub fn suggestions<'a>(&self, known: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        filter_suggestions(&self.search, known, |name| {
            contains_name(&self.selected, name)
        })
    }

    pub fn validate(&mut self) -> Result<L, FormErrors> {
        self.validate_at(Utc::now())
    }

    /// Validate against a given current time
    pub fn validate_at(&mut self, now: DateTime<Utc>) -> Result<L, FormErrors> {
        let mut errors = FormErrors::default();
        check_names(L::KIND, self.selected.iter().map(String::as_str), &mut errors);
        let logged_at = self.when.logged_at(now, &mut errors);
        let note = self.when.note(&mut errors);

        self.errors = errors.clone();
        let Some(logged_at) = logged_at.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        let mut log = match &self.existing {
            Some(existing) => {
                let mut log = existing.clone();
                log.set_logged_at(logged_at);
                log
            }
            None => L::create(logged_at),
        };
        log.set_item_names(self.selected.clone());
        log.set_note(note);
        Ok(log)
    }
}

impl FoodLogForm {
    pub fn from_food_log(log: &FoodLog) -> Self {
        Self::from_log(log)
    }
}

impl DrinkLogForm {
    pub fn from_drink_log(log: &DrinkLog) -> Self {
        Self::from_log(log)
    }
}

// ==================== Symptoms ====================

/// Form for symptom logs; each selected symptom has a severity
#[derive(Debug, Clone)]
pub struct SymptomLogForm {
    search: String,
    selected: Vec<SymptomEntry>,
    when: When,
    errors: FormErrors,
    existing: Option<SymptomLog>,
}

impl Default for SymptomLogForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SymptomLogForm {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            selected: Vec::new(),
            when: When::now(),
            errors: FormErrors::default(),
            existing: None,
        }
    }

    pub fn from_symptom_log(log: &SymptomLog) -> Self {
        Self {
            search: String::new(),
            selected: log.symptoms.clone(),
            when: When::from_log(log.logged_at, log.note.as_deref()),
            errors: FormErrors::default(),
            existing: Some(log.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.existing.is_some()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn selected(&self) -> &[SymptomEntry] {
        &self.selected
    }

    pub fn date(&self) -> NaiveDate {
        self.when.date
    }

    pub fn time(&self) -> NaiveTime {
        self.when.time
    }

    pub fn note(&self) -> &str {
        &self.when.note
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn set_future_tolerance(&mut self, tolerance: Duration) {
        self.when.tolerance = tolerance;
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.selected
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn apply(&mut self, intent: FormIntent) {
        if self.when.apply(&intent) {
            return;
        }
        match intent {
            FormIntent::SetSearch(search) => self.search = search,
            FormIntent::Select(name) => {
                if let Some(name) = normalize_name(&name) {
                    if self.position(&name).is_none() {
                        self.selected.push(SymptomEntry::new(name, Severity::default()));
                    }
                    self.search.clear();
                }
            }
            FormIntent::Deselect(name) => {
                if let Some(pos) = self.position(name.trim()) {
                    self.selected.remove(pos);
                }
            }
            // Setting a severity on an unselected symptom selects it
            FormIntent::SetSeverity(name, severity) => {
                if let Some(name) = normalize_name(&name) {
                    match self.position(&name) {
                        Some(pos) => self.selected[pos].severity = severity,
                        None => self.selected.push(SymptomEntry::new(name, severity)),
                    }
                }
            }
            _ => {}
        }
    }

    pub fn suggestions<'a>(&self, known: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        filter_suggestions(&self.search, known, |name| self.position(name).is_some())
    }

    pub fn validate(&mut self) -> Result<SymptomLog, FormErrors> {
        self.validate_at(Utc::now())
    }

    pub fn validate_at(&mut self, now: DateTime<Utc>) -> Result<SymptomLog, FormErrors> {
        let mut errors = FormErrors::default();
        check_names(
            ItemKind::Symptom,
            self.selected.iter().map(|s| s.name.as_str()),
            &mut errors,
        );
        let logged_at = self.when.logged_at(now, &mut errors);
        let note = self.when.note(&mut errors);

        self.errors = errors.clone();
        let Some(logged_at) = logged_at.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        let mut log = match &self.existing {
            Some(existing) => {
                let mut log = existing.clone();
                log.set_logged_at(logged_at);
                log
            }
            None => SymptomLog::new(logged_at),
        };
        log.set_symptoms(self.selected.clone());
        log.set_note(note);
        Ok(log)
    }
}

// ==================== Movements ====================

/// Form for bowel movement logs
#[derive(Debug, Clone)]
pub struct MovementLogForm {
    stool_type: Option<StoolType>,
    when: When,
    errors: FormErrors,
    existing: Option<MovementLog>,
}

impl Default for MovementLogForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementLogForm {
    pub fn new() -> Self {
        Self {
            stool_type: None,
            when: When::now(),
            errors: FormErrors::default(),
            existing: None,
        }
    }

    pub fn from_movement_log(log: &MovementLog) -> Self {
        Self {
            stool_type: Some(log.stool_type),
            when: When::from_log(log.logged_at, log.note.as_deref()),
            errors: FormErrors::default(),
            existing: Some(log.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.existing.is_some()
    }

    pub fn stool_type(&self) -> Option<StoolType> {
        self.stool_type
    }

    pub fn date(&self) -> NaiveDate {
        self.when.date
    }

    pub fn time(&self) -> NaiveTime {
        self.when.time
    }

    pub fn note(&self) -> &str {
        &self.when.note
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn set_future_tolerance(&mut self, tolerance: Duration) {
        self.when.tolerance = tolerance;
    }

    pub fn apply(&mut self, intent: FormIntent) {
        if self.when.apply(&intent) {
            return;
        }
        if let FormIntent::SetStoolType(stool_type) = intent {
            self.stool_type = Some(stool_type);
        }
    }

    pub fn validate(&mut self) -> Result<MovementLog, FormErrors> {
        self.validate_at(Utc::now())
    }

    pub fn validate_at(&mut self, now: DateTime<Utc>) -> Result<MovementLog, FormErrors> {
        let mut errors = FormErrors::default();
        if self.stool_type.is_none() {
            errors.items = Some(format!(
                "Choose a stool type ({}-{})",
                StoolType::MIN,
                StoolType::MAX
            ));
        }
        let logged_at = self.when.logged_at(now, &mut errors);
        let note = self.when.note(&mut errors);

        self.errors = errors.clone();
        let (Some(stool_type), Some(logged_at)) = (self.stool_type, logged_at) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut log = match &self.existing {
            Some(existing) => {
                let mut log = existing.clone();
                log.set_logged_at(logged_at);
                log.set_stool_type(stool_type);
                log
            }
            None => MovementLog::new(logged_at, stool_type),
        };
        log.set_note(note);
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: NaiveDate, h: u32, m: u32) -> Vec<FormIntent> {
        vec![
            FormIntent::SetDate(date),
            FormIntent::SetTime(NaiveTime::from_hms_opt(h, m, 0).unwrap()),
        ]
    }

    fn yesterday() -> NaiveDate {
        Local::now().date_naive().pred_opt().unwrap()
    }

    #[test]
    fn test_food_form_builds_log() {
        let mut form = FoodLogForm::new();
        for intent in at(yesterday(), 12, 30) {
            form.apply(intent);
        }
        form.apply(FormIntent::SetSearch("ri".to_string()));
        form.apply(FormIntent::Select("Rice".to_string()));
        form.apply(FormIntent::Select(" rice ".to_string()));
        form.apply(FormIntent::Select("Beans".to_string()));
        form.apply(FormIntent::SetNote("  lunch  ".to_string()));

        assert_eq!(form.search(), "");
        let log = form.validate().unwrap();
        assert_eq!(log.foods, vec!["Rice", "Beans"]);
        assert_eq!(log.note.as_deref(), Some("lunch"));
        assert_eq!(
            log.logged_at,
            local_timestamp(yesterday(), NaiveTime::from_hms_opt(12, 30, 0).unwrap()).unwrap()
        );
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_empty_selection_and_long_note() {
        let mut form = DrinkLogForm::new();
        form.apply(FormIntent::SetNote("x".repeat(MAX_NOTE_LEN + 1)));

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.items.as_deref(), Some("Select at least one drink"));
        assert!(errors.note.is_some());
        assert!(errors.when.is_none());
        assert_eq!(form.errors(), &errors);
    }

    #[test]
    fn test_long_item_name_rejected() {
        let mut form = FoodLogForm::new();
        form.apply(FormIntent::Select("a".repeat(MAX_NAME_LEN + 1)));
        let errors = form.validate().unwrap_err();
        assert!(errors.items.unwrap().contains("too long"));
    }

    #[test]
    fn test_future_tolerance() {
        let now = Utc::now();
        let mut form = FoodLogForm::new();
        form.apply(FormIntent::Select("tea biscuits".to_string()));

        let soon = (now + Duration::minutes(3)).with_timezone(&Local);
        form.apply(FormIntent::SetDate(soon.date_naive()));
        form.apply(FormIntent::SetTime(soon.time()));
        assert!(form.validate_at(now).is_ok());

        let later = (now + Duration::minutes(30)).with_timezone(&Local);
        form.apply(FormIntent::SetDate(later.date_naive()));
        form.apply(FormIntent::SetTime(later.time()));
        let errors = form.validate_at(now).unwrap_err();
        assert_eq!(errors.when.as_deref(), Some("Time cannot be in the future"));

        form.set_future_tolerance(Duration::hours(1));
        assert!(form.validate_at(now).is_ok());
    }

    #[test]
    fn test_suggestions_prefix_first_and_exclude_selected() {
        let mut form = FoodLogForm::new();
        let known = ["Apple pie", "Crab apple", "Apple", "Pear", "Pineapple"];

        form.apply(FormIntent::Select("apple".to_string()));
        form.apply(FormIntent::SetSearch("APP".to_string()));

        assert_eq!(
            form.suggestions(known),
            vec!["Apple pie", "Crab apple", "Pineapple"]
        );

        form.apply(FormIntent::SetSearch(String::new()));
        assert_eq!(form.suggestions(known).len(), 4);
    }

    #[test]
    fn test_edit_keeps_id_and_created_at() {
        let original_time = Utc::now() - Duration::days(2);
        let mut log = FoodLog::new(original_time);
        log.add_food("soup");
        log.set_note(Some("dinner".to_string()));

        let mut form = FoodLogForm::from_food_log(&log);
        assert!(form.is_editing());
        assert_eq!(form.note(), "dinner");
        form.apply(FormIntent::Deselect("SOUP".to_string()));
        form.apply(FormIntent::Select("stew".to_string()));

        let edited = form.validate().unwrap();
        assert_eq!(edited.id, log.id);
        assert_eq!(edited.created_at, log.created_at);
        // Untouched date/time keeps the exact original instant
        assert_eq!(edited.logged_at, original_time);
        assert_eq!(edited.foods, vec!["stew"]);
    }

    #[test]
    fn test_symptom_form_severity() {
        let mut form = SymptomLogForm::new();
        for intent in at(yesterday(), 8, 0) {
            form.apply(intent);
        }
        form.apply(FormIntent::Select("bloating".to_string()));
        form.apply(FormIntent::SetSeverity("Bloating".to_string(), Severity::Severe));
        form.apply(FormIntent::SetSeverity("nausea".to_string(), Severity::Moderate));
        form.apply(FormIntent::Select("cramps".to_string()));

        let log = form.validate().unwrap();
        assert_eq!(
            log.symptoms,
            vec![
                SymptomEntry::new("bloating", Severity::Severe),
                SymptomEntry::new("nausea", Severity::Moderate),
                SymptomEntry::new("cramps", Severity::Mild),
            ]
        );

        let known = ["bloating", "belching"];
        form.apply(FormIntent::SetSearch("b".to_string()));
        assert_eq!(form.suggestions(known), vec!["belching"]);
    }

    #[test]
    fn test_symptom_form_requires_symptom() {
        let mut form = SymptomLogForm::new();
        form.apply(FormIntent::Select("headache".to_string()));
        form.apply(FormIntent::Deselect("headache".to_string()));
        assert_eq!(
            form.validate().unwrap_err().items.as_deref(),
            Some("Select at least one symptom")
        );
    }

    #[test]
    fn test_movement_form() {
        let mut form = MovementLogForm::new();
        for intent in at(yesterday(), 7, 15) {
            form.apply(intent);
        }
        assert!(form.validate().unwrap_err().items.is_some());

        form.apply(FormIntent::SetStoolType(StoolType::new(4).unwrap()));
        // Ignored by movement forms
        form.apply(FormIntent::Select("toast".to_string()));
        let log = form.validate().unwrap();
        assert_eq!(log.stool_type.value(), 4);

        let mut edit = MovementLogForm::from_movement_log(&log);
        edit.apply(FormIntent::SetStoolType(StoolType::new(6).unwrap()));
        let edited = edit.validate().unwrap();
        assert_eq!(edited.id, log.id);
        assert_eq!(edited.stool_type.value(), 6);
    }

    #[test]
    fn test_errors_display() {
        let errors = FormErrors {
            items: Some("Select at least one food".to_string()),
            when: None,
            note: Some("Note too long".to_string()),
        };
        assert_eq!(
            errors.to_string(),
            "Select at least one food; Note too long"
        );
    }

    #[test]
    fn test_resolve_when_rejects_dst_gap() {
        // Clocks in Sao Paulo jumped from 00:00 to 01:00 on 2018-11-04
        let tz = chrono_tz::America::Sao_Paulo;
        let date = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let time = NaiveTime::from_hms_opt(0, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2018, 11, 5, 0, 0, 0).unwrap();

        assert!(timestamp_in(&tz, date, time).is_none());
        let errors = resolve_when(&tz, date, time, now, Duration::minutes(5)).unwrap_err();
        assert_eq!(
            errors.when.as_deref(),
            Some("2018-11-04 00:30 does not exist in the local time zone")
        );
        assert!(errors.items.is_none());
        assert!(errors.note.is_none());

        // Just after the gap is fine
        let time = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
        assert_eq!(
            resolve_when(&tz, date, time, now, Duration::minutes(5)).unwrap(),
            Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_resolve_when_ambiguous_time_takes_earlier_instant() {
        // 23:xx on 2019-02-16 happened twice in Sao Paulo (-02 then -03)
        let tz = chrono_tz::America::Sao_Paulo;
        let date = NaiveDate::from_ymd_opt(2019, 2, 16).unwrap();
        let time = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap();

        assert_eq!(
            resolve_when(&tz, date, time, now, Duration::minutes(5)).unwrap(),
            Utc.with_ymd_and_hms(2019, 2, 17, 1, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_resolve_when_future_tolerance() {
        let tz = chrono_tz::Europe::London;
        let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let tolerance = Duration::minutes(5);

        let soon = NaiveTime::from_hms_opt(12, 5, 0).unwrap();
        assert!(resolve_when(&tz, date, soon, now, tolerance).is_ok());

        let later = NaiveTime::from_hms_opt(12, 6, 0).unwrap();
        assert_eq!(
            resolve_when(&tz, date, later, now, tolerance)
                .unwrap_err()
                .when
                .as_deref(),
            Some("Time cannot be in the future")
        );
    }
}
