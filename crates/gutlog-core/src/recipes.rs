//! Recipe service client
//!
//! Talks to a Paprika-style recipe sync API so that the ingredients of saved
//! recipes can be imported as foods.
//!
//! ## Endpoints
//!
//! - `GET {base}/sync/recipes/` lists `{uid, hash}` pairs
//! - `GET {base}/sync/recipe/{uid}/` returns one recipe
//!
//! Both wrap their payload in `{"result": ...}` and require HTTP Basic auth.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{normalize_name, MAX_NAME_LEN};

/// Request timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Errors from the recipe service
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("No recipe service credentials. Run `gutlog recipe login` first.")]
    MissingCredentials,

    #[error("Invalid recipe service URL '{0}'")]
    InvalidUrl(String),

    #[error("Recipe service rejected the credentials (401). Check your username and password.")]
    Unauthorized,

    #[error("Recipe service returned HTTP {0}")]
    Status(u16),

    #[error("Recipe service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from recipe service: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Username and password for the recipe service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A recipe listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub uid: String,
    pub hash: String,
}

/// A full recipe
///
/// Only the fields gutlog uses are kept; the service sends many more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub uid: String,
    pub name: String,
    /// Newline-separated ingredient lines
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub servings: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

impl Recipe {
    /// Food names parsed from the ingredient lines, lowercased and de-duplicated
    pub fn ingredient_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        for line in self.ingredients.as_deref().unwrap_or_default().lines() {
            if let Some(name) = parse_ingredient(line) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        names
    }
}

/// Client for the recipe sync API
pub struct RecipeClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    credentials: Credentials,
}

impl RecipeClient {
    /// Build a client; fails without credentials
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self, RecipeError> {
        let credentials = credentials.ok_or(RecipeError::MissingCredentials)?;
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|_| RecipeError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(RecipeError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT))
            .user_agent(concat!("gutlog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// List every recipe in the account
    pub async fn list_recipes(&self) -> Result<Vec<RecipeSummary>, RecipeError> {
        self.get(&["sync", "recipes", ""]).await
    }

    /// Fetch one recipe by uid
    pub async fn get_recipe(&self, uid: &str) -> Result<Recipe, RecipeError> {
        self.get(&["sync", "recipe", uid, ""]).await
    }

    /// The base URL with `segments` appended, each percent-encoded
    ///
    /// A trailing empty segment gives the trailing slash the API expects.
    fn endpoint(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RecipeError> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RecipeError::Unauthorized);
        }
        if !status.is_success() {
            return Err(RecipeError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.result)
    }
}

// ==================== Ingredient parsing ====================

const UNITS: &[&str] = &[
    "c", "cup", "cups", "tbsp", "tbs", "tbl", "tablespoon", "tablespoons", "tsp", "teaspoon",
    "teaspoons", "g", "gram", "grams", "kg", "mg", "ml", "l", "liter", "liters", "litre",
    "litres", "oz", "ounce", "ounces", "lb", "lbs", "pound", "pounds", "pint", "pints", "pt",
    "quart", "quarts", "qt", "pinch", "pinches", "dash", "dashes", "clove", "cloves", "can",
    "cans", "slice", "slices", "stick", "sticks", "bunch", "bunches", "handful", "handfuls",
    "package", "packages", "pkg", "piece", "pieces", "sprig", "sprigs",
];

const FRACTIONS: &str = "½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞";

/// Parse one ingredient line into a food name
fn parse_ingredient(line: &str) -> Option<String> {
    let line = line.trim().trim_start_matches(['-', '*', '•']).trim();
    if line.is_empty() || line.ends_with(':') {
        return None;
    }

    let without_notes = strip_parentheticals(line);
    let head = without_notes.split(',').next().unwrap_or_default().to_lowercase();
    let tokens: Vec<&str> = head.split_whitespace().collect();

    let mut idx = 0;
    let mut had_quantity = false;
    while let Some(token) = tokens.get(idx) {
        if is_quantity(token) || (idx == 0 && matches!(*token, "a" | "an")) {
            had_quantity = true;
            idx += 1;
        } else if had_quantity && *token == "to" {
            idx += 1;
        } else if is_quantity_with_unit(token) {
            // "200g" carries its own unit
            had_quantity = true;
            idx += 1;
            break;
        } else {
            break;
        }
    }

    if had_quantity && tokens.get(idx).is_some_and(|t| UNITS.contains(t)) {
        idx += 1;
    }
    if tokens.get(idx) == Some(&"of") {
        idx += 1;
    }

    let name = tokens[idx..].join(" ");
    let name = normalize_name(name.trim_end_matches(['.', ';']))?;
    (name.chars().count() <= MAX_NAME_LEN).then_some(name)
}

/// Remove `(...)` groups; an unclosed group drops the rest of the line
fn strip_parentheticals(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut depth = 0usize;
    for c in line.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Integers, decimals, fractions, unicode fractions and ranges like `1-2`
fn is_quantity(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit() || FRACTIONS.contains(c))
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || FRACTIONS.contains(c) || "./-–".contains(c))
}

/// Tokens like `200g` or `2tbsp`
fn is_quantity_with_unit(token: &str) -> bool {
    match token.find(|c: char| !(c.is_ascii_digit() || c == '.')) {
        Some(split) if split > 0 => UNITS.contains(&&token[split..]),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUTH: &str = "Basic YW5uQGV4YW1wbGUuY29tOmh1bnRlcjI=";

    fn recipe(ingredients: &str) -> Recipe {
        Recipe {
            uid: "r1".to_string(),
            name: "Test".to_string(),
            ingredients: Some(ingredients.to_string()),
            servings: None,
            source: None,
        }
    }

    fn client(server: &MockServer) -> RecipeClient {
        RecipeClient::new(
            &format!("{}/api/v1/", server.uri()),
            Some(Credentials::new("ann@example.com", "hunter2")),
        )
        .unwrap()
    }

    #[test]
    fn test_ingredient_names() {
        let r = recipe(
            "For the sauce:\n\
             2 cups flour\n\
             1 1/2 tsp baking soda\n\
             ½ cup Sugar (granulated)\n\
             3 cloves garlic, minced\n\
             \n\
             1-2 tbsp olive oil\n\
             200g butter\n\
             a pinch of salt\n\
             Fresh basil leaves\n\
             2 cups flour",
        );

        assert_eq!(
            r.ingredient_names(),
            vec![
                "flour",
                "baking soda",
                "sugar",
                "garlic",
                "olive oil",
                "butter",
                "salt",
                "fresh basil leaves",
            ]
        );
    }

    #[test]
    fn test_ingredient_lines_without_names_are_skipped() {
        let r = recipe("(optional)\n3\n   \nTopping:");
        assert!(r.ingredient_names().is_empty());

        let empty = Recipe {
            ingredients: None,
            ..recipe("")
        };
        assert!(empty.ingredient_names().is_empty());
    }

    #[test]
    fn test_unit_word_kept_without_quantity() {
        assert_eq!(parse_ingredient("can of beans").as_deref(), Some("can of beans"));
        assert_eq!(parse_ingredient("2 cans of beans").as_deref(), Some("beans"));
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            RecipeClient::new("http://localhost", None),
            Err(RecipeError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_list_recipes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sync/recipes/"))
            .and(header("authorization", AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": [
                    {"uid": "A1", "hash": "h1"},
                    {"uid": "B2", "hash": "h2"}
                ]
            })))
            .mount(&server)
            .await;

        let recipes = client(&server).list_recipes().await.unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[1].uid, "B2");
    }

    #[tokio::test]
    async fn test_get_recipe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sync/recipe/A1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {
                    "uid": "A1",
                    "name": "Pancakes",
                    "ingredients": "1 cup milk\n2 eggs",
                    "directions": "Mix and fry.",
                    "rating": 5
                }
            })))
            .mount(&server)
            .await;

        let recipe = client(&server).get_recipe("A1").await.unwrap();
        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.ingredient_names(), vec!["milk", "eggs"]);
    }

    #[tokio::test]
    async fn test_unauthorized_and_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sync/recipes/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sync/recipe/missing/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(
            client.list_recipes().await,
            Err(RecipeError::Unauthorized)
        ));
        assert!(matches!(
            client.get_recipe("missing").await,
            Err(RecipeError::Status(404))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sync/recipes/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).list_recipes().await,
            Err(RecipeError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_get_recipe_encodes_uid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sync/recipe/a%2Fb%3Fc/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"uid": "a/b?c", "name": "Odd uid", "ingredients": "1 egg"}
            })))
            .mount(&server)
            .await;

        let recipe = client(&server).get_recipe("a/b?c").await.unwrap();
        assert_eq!(recipe.uid, "a/b?c");
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let credentials = Some(Credentials::new("ann", "pw"));
        for base in ["http://recipes.local/api/v1", "http://recipes.local/api/v1/"] {
            let client = RecipeClient::new(base, credentials.clone()).unwrap();
            assert_eq!(
                client.endpoint(&["sync", "recipes", ""]).as_str(),
                "http://recipes.local/api/v1/sync/recipes/"
            );
        }

        assert!(matches!(
            RecipeClient::new("not a url", credentials),
            Err(RecipeError::InvalidUrl(_))
        ));
    }
}
