//! Field annotation grammar.
//!
//! A tag is a comma-separated list of `key=value` entries. The first entry
//! without a `key=` prefix is the documentation string and swallows the rest
//! of the tag, commas included:
//!
//! ```text
//! name=env, oneof=dev|prod, development environment, see README
//! ```
//!
//! Recognized keys are `flag`, `name`, `doc`, `oneof`, `min` and `opt`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RegistrationError;

static KEY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*=").expect("valid key pattern"));

/// The recognized tag keys.
pub const KEYS: &[&str] = &["flag", "name", "doc", "oneof", "min", "opt"];

/// Raw key/value map produced from one tag, before key validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    entries: BTreeMap<String, String>,
}

impl TagOptions {
    /// Split a tag into its entries. Never fails; unknown keys are kept so
    /// [`TagOptions::into_tag`] can report them.
    pub fn parse(tag: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut rest = tag.trim();
        while !rest.is_empty() {
            let Some(prefix) = KEY_PREFIX.find(rest) else {
                entries.insert("doc".to_string(), rest.to_string());
                break;
            };
            let key = &rest[..prefix.end() - 1];
            let after = &rest[prefix.end()..];
            let value = match after.split_once(',') {
                Some((value, tail)) => {
                    rest = tail.trim();
                    value
                }
                None => {
                    rest = "";
                    after
                }
            };
            entries.insert(key.to_string(), value.trim().to_string());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check the key vocabulary and convert into a typed [`Tag`].
    pub fn into_tag(mut self) -> Result<Tag, RegistrationError> {
        for key in self.entries.keys() {
            if key.is_empty() {
                return Err(RegistrationError::EmptyKey);
            }
            if !KEYS.contains(&key.as_str()) {
                return Err(RegistrationError::InvalidKey(key.clone()));
            }
        }
        Ok(Tag {
            flag: self.entries.remove("flag"),
            name: self.entries.remove("name"),
            doc: self.entries.remove("doc").unwrap_or_default(),
            oneof: self.entries.remove("oneof"),
            min: self.entries.remove("min"),
            opt: self.entries.remove("opt"),
        })
    }
}

/// A validated field annotation.
///
/// `Some("")` and `None` differ: `flag=` asks for a flag whose name is
/// derived from the field, while a missing `flag` makes the field
/// positional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub flag: Option<String>,
    pub name: Option<String>,
    pub doc: String,
    pub oneof: Option<String>,
    pub min: Option<String>,
    pub opt: Option<String>,
}

impl Tag {
    pub fn parse(tag: &str) -> Result<Self, RegistrationError> {
        TagOptions::parse(tag).into_tag()
    }

    pub fn is_flag(&self) -> bool {
        self.flag.is_some()
    }

    /// The `oneof` choices, trimmed, in declaration order.
    pub fn choices(&self) -> Option<Vec<String>> {
        self.oneof
            .as_deref()
            .map(|oneof| oneof.split('|').map(|c| c.trim().to_string()).collect())
    }
}
