//! Flattening of embedded contact lists.
//!
//! DMPonline sometimes hands contact lists back as a string holding a
//! single-quoted, JSON-like rendering of the list:
//!
//! ```text
//! [{'name': 'Ada', 'email': 'ada@x.org'}, {'name': 'Bob', 'email': 'bob@x.org'}]
//! ```
//!
//! Swapping the quotes makes that valid JSON, unless a value itself contains an
//! apostrophe (`"O'Brien"`). For those lists the email addresses are recovered
//! by pattern matching instead. The recovery is best-effort: it may pick up
//! addresses that sit under a different key, and it misses addresses with
//! characters outside `[a-z.-]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z.-]+@[a-z.-]+").expect("email pattern is valid")
});

/// Separator between joined contacts.
pub const SEPARATOR: &str = "; ";

/// Ways of reading a string-encoded contact list, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Swap single for double quotes and parse as a JSON list of objects.
    QuotedJson,
    /// Collect everything that looks like an email address.
    EmailPattern,
}

impl Strategy {
    pub const CHAIN: [Strategy; 2] = [Strategy::QuotedJson, Strategy::EmailPattern];

    /// Apply this strategy, or `None` if the input can't be read this way.
    pub fn apply(self, raw: &str, key: &str) -> Option<String> {
        match self {
            Self::QuotedJson => {
                let items: Vec<Map<String, Value>> =
                    serde_json::from_str(&raw.replace('\'', "\"")).ok()?;
                Some(join_key(&items, key))
            }
            Self::EmailPattern => Some(
                EMAIL
                    .find_iter(raw)
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(SEPARATOR),
            ),
        }
    }
}

/// Join the `key` field of every contact, in order. Contacts without `key`
/// are skipped.
pub fn extract_contacts(raw: &Value, key: &str) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => extract_from_str(s, key),
        Value::Array(items) => {
            let objects: Vec<Map<String, Value>> = items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect();
            join_key(&objects, key)
        }
        other => extract_from_str(&other.to_string(), key),
    }
}

/// Run a string-encoded contact list through [`Strategy::CHAIN`].
pub fn extract_from_str(raw: &str, key: &str) -> String {
    for strategy in Strategy::CHAIN {
        if let Some(joined) = strategy.apply(raw, key) {
            return joined;
        }
        debug!(
            "contact list not readable as {:?}, likely a quote in a contact's name",
            strategy
        );
    }
    String::new()
}

fn join_key(items: &[Map<String, Value>], key: &str) -> String {
    items
        .iter()
        .filter_map(|item| item.get(key))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
