//! Keyword-rule categorization engine
//!
//! Maps a merchant/description string to a spending category using ordered
//! keyword rules. Built-in defaults cover the common categories; an optional
//! external taxonomy file can extend (never replace) them per category.
//!
//! Matching is order-sensitive: categories are scanned in rule order and the
//! first keyword that is a substring of the normalized text wins. Rule order
//! is defaults first, then any categories the taxonomy file introduces, in
//! file order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

/// One category with its ordered keyword list
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// A loaded, immutable rule set
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub version: String,
    pub rules: Vec<CategoryRule>,
}

/// Result of categorizing a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: String,
    /// `keyword:<kw>` for a hit, `fallback:other` otherwise
    pub reason: String,
}

/// Category assigned when no keyword matches
pub const FALLBACK_CATEGORY: &str = "other";

/// Built-in categorization defaults. Order matters: the first category whose
/// keyword matches wins.
const DEFAULT_RULES: &[(&str, &[&str])] = &[
    (
        "grocery",
        &[
            "whole foods",
            "trader joe",
            "kroger",
            "שופרסל",
            "רמי לוי",
            "ויקטורי",
        ],
    ),
    (
        "subscriptions",
        &["netflix", "spotify", "apple", "adobe", "youtube premium"],
    ),
    ("transport", &["shell", "uber", "lyft", "דלק", "fuel"]),
    (
        "card_payment",
        &["מסטרקרד", "mastercard", "visa", "amex", "credit card"],
    ),
    (
        "cash_withdrawal",
        &["משיכה מבנקט", "atm withdrawal", "cash withdrawal"],
    ),
    (
        "transfers",
        &[
            "העב' לאחר-נייד",
            "העברה-נייד",
            "bit העברת כסף",
            "bank transfer",
            "bit",
        ],
    ),
    ("loan_interest", &["הו\"ק הלו' רבית", "loan interest"]),
    ("loan_principal", &["הו\"ק הלואה קרן", "loan principal"]),
    ("savings_deposit", &["פקדון", "deposit"]),
    (
        "benefits_income",
        &["זיכוי מלאומי", "בטוח לאומי", "מענק", "מופ\"ת מילואים"],
    ),
];

/// Source of categorization rules
///
/// Isolates the defaults-vs-external-file choice behind one seam so callers
/// (and tests) can inject rule sets without touching the filesystem.
pub trait RuleSource {
    fn load(&self) -> RuleSet;
}

/// Built-in defaults only
#[derive(Debug, Default)]
pub struct DefaultRules;

impl RuleSource for DefaultRules {
    fn load(&self) -> RuleSet {
        RuleSet {
            version: "v1-default".to_string(),
            rules: normalized_defaults(),
        }
    }
}

/// External JSON taxonomy file layered on top of the defaults
///
/// Expected shape: `{"version": "...", "rules": {"category": ["kw", ...]}}`.
/// An absent, unreadable, or malformed file falls back silently to defaults.
#[derive(Debug)]
pub struct TaxonomyFile {
    path: PathBuf,
}

impl TaxonomyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    version: Option<serde_json::Value>,
    rules: Option<serde_json::Value>,
}

impl RuleSource for TaxonomyFile {
    fn load(&self) -> RuleSet {
        let defaults = DefaultRules.load();

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return defaults,
        };

        let document: TaxonomyDocument = match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring malformed taxonomy file");
                return defaults;
            }
        };

        let rules = match document.rules.as_ref().and_then(|v| v.as_object()) {
            Some(map) if !map.is_empty() => map,
            _ => return defaults,
        };

        let version = match document.version {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => "v1".to_string(),
        };

        let mut merged = defaults.rules;
        for (category, keywords) in rules {
            let Some(items) = keywords.as_array() else {
                continue;
            };
            let extra: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(normalize_text)
                .collect();

            match merged.iter_mut().find(|rule| rule.category == *category) {
                Some(rule) => rule.keywords.extend(extra),
                None => merged.push(CategoryRule {
                    category: category.clone(),
                    keywords: extra,
                }),
            }
        }

        // Deterministic keyword order within each category: dedup + sort.
        // Cross-category priority is unaffected (governed by rule order).
        for rule in &mut merged {
            rule.keywords.sort();
            rule.keywords.dedup();
        }

        RuleSet {
            version,
            rules: merged,
        }
    }
}

/// Keyword-rule categorization engine, immutable after load
#[derive(Debug, Clone)]
pub struct CategorizationEngine {
    version: String,
    rules: Vec<CategoryRule>,
}

impl CategorizationEngine {
    /// Build from the built-in defaults
    pub fn with_defaults() -> Self {
        Self::from_source(&DefaultRules)
    }

    /// Build from any rule source
    pub fn from_source(source: &dyn RuleSource) -> Self {
        let RuleSet { version, rules } = source.load();
        Self { version, rules }
    }

    /// Build from an optional taxonomy file path; `None` means defaults
    pub fn from_taxonomy_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::from_source(&TaxonomyFile::new(p)),
            None => Self::with_defaults(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Categorize a merchant/description pair
    ///
    /// Pure function of the inputs and the loaded rule set: the concatenated
    /// text is lower-cased and whitespace-collapsed, then scanned against
    /// categories in rule order; the first keyword contained in the text wins.
    pub fn categorize(&self, merchant: &str, description: &str) -> CategoryMatch {
        let haystack = normalize_text(&format!("{} {}", merchant, description));
        for rule in &self.rules {
            for keyword in &rule.keywords {
                if haystack.contains(keyword.as_str()) {
                    return CategoryMatch {
                        category: rule.category.clone(),
                        reason: format!("keyword:{}", keyword),
                    };
                }
            }
        }
        CategoryMatch {
            category: FALLBACK_CATEGORY.to_string(),
            reason: format!("fallback:{}", FALLBACK_CATEGORY),
        }
    }
}

fn normalized_defaults() -> Vec<CategoryRule> {
    DEFAULT_RULES
        .iter()
        .map(|(category, keywords)| CategoryRule {
            category: (*category).to_string(),
            keywords: keywords.iter().map(|kw| normalize_text(kw)).collect(),
        })
        .collect()
}

/// Lower-case and collapse internal whitespace to single spaces
fn normalize_text(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_keyword_match_with_reason() {
        let engine = CategorizationEngine::with_defaults();
        let result = engine.categorize("NETFLIX.COM", "");
        assert_eq!(result.category, "subscriptions");
        assert_eq!(result.reason, "keyword:netflix");
    }

    #[test]
    fn test_whitespace_and_case_normalization() {
        let engine = CategorizationEngine::with_defaults();
        let result = engine.categorize("  WHOLE   Foods  Market ", "  weekly  shop ");
        assert_eq!(result.category, "grocery");
    }

    #[test]
    fn test_description_participates_in_matching() {
        let engine = CategorizationEngine::with_defaults();
        let result = engine.categorize("Acme Corp", "monthly spotify family plan");
        assert_eq!(result.category, "subscriptions");
        assert_eq!(result.reason, "keyword:spotify");
    }

    #[test]
    fn test_fallback_to_other() {
        let engine = CategorizationEngine::with_defaults();
        let result = engine.categorize("Mysterious Vendor 42", "");
        assert_eq!(result.category, "other");
        assert_eq!(result.reason, "fallback:other");
    }

    #[test]
    fn test_first_category_wins() {
        // "shell" (transport) appears before any later category that could
        // also match a combined string.
        let engine = CategorizationEngine::with_defaults();
        let result = engine.categorize("Shell", "visa purchase");
        assert_eq!(result.category, "transport");
    }

    fn write_taxonomy(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_taxonomy_extends_defaults() {
        let file = write_taxonomy(
            r#"{"version": "v2", "rules": {"grocery": ["Corner  Market"], "pets": ["petco"]}}"#,
        );
        let engine = CategorizationEngine::from_taxonomy_path(Some(file.path()));

        assert_eq!(engine.version(), "v2");
        // Extended keyword, normalized
        let result = engine.categorize("CORNER MARKET #12", "");
        assert_eq!(result.category, "grocery");
        assert_eq!(result.reason, "keyword:corner market");
        // New category appended after the defaults
        let result = engine.categorize("Petco", "");
        assert_eq!(result.category, "pets");
        // Defaults still intact
        let result = engine.categorize("netflix", "");
        assert_eq!(result.category, "subscriptions");
    }

    #[test]
    fn test_default_categories_keep_priority_over_new_ones() {
        // A new category matching the same text must lose to an earlier default.
        let file = write_taxonomy(r#"{"rules": {"streaming": ["netflix"]}}"#);
        let engine = CategorizationEngine::from_taxonomy_path(Some(file.path()));
        let result = engine.categorize("netflix", "");
        assert_eq!(result.category, "subscriptions");
    }

    #[test]
    fn test_keywords_deduped_and_sorted() {
        let file = write_taxonomy(r#"{"rules": {"grocery": ["zzz market", "Kroger", "aaa mart"]}}"#);
        let engine = CategorizationEngine::from_taxonomy_path(Some(file.path()));
        let grocery = engine
            .rules
            .iter()
            .find(|r| r.category == "grocery")
            .unwrap();
        let mut sorted = grocery.keywords.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(grocery.keywords, sorted);
        assert_eq!(
            grocery.keywords.iter().filter(|k| *k == "kroger").count(),
            1
        );
    }

    #[test]
    fn test_missing_file_falls_back_silently() {
        let engine =
            CategorizationEngine::from_taxonomy_path(Some(Path::new("/nonexistent/rules.json")));
        assert_eq!(engine.version(), "v1-default");
        assert_eq!(engine.categorize("uber trip", "").category, "transport");
    }

    #[test]
    fn test_malformed_file_falls_back_silently() {
        let file = write_taxonomy("{not json");
        let engine = CategorizationEngine::from_taxonomy_path(Some(file.path()));
        assert_eq!(engine.version(), "v1-default");
    }

    #[test]
    fn test_non_mapping_rules_fall_back() {
        let file = write_taxonomy(r#"{"version": "v9", "rules": []}"#);
        let engine = CategorizationEngine::from_taxonomy_path(Some(file.path()));
        assert_eq!(engine.version(), "v1-default");

        let file = write_taxonomy(r#"{"version": "v9", "rules": {}}"#);
        let engine = CategorizationEngine::from_taxonomy_path(Some(file.path()));
        assert_eq!(engine.version(), "v1-default");
    }
}
