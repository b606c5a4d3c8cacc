//! `codereview.settings` parsing
//!
//! The settings file is newline-delimited `KEY: value` text. Only lines that
//! begin with the key itself count; comments and anything without a `": "`
//! separator are skipped. The first occurrence of a key wins.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeReviewSettings {
    entries: BTreeMap<String, String>,
}

impl CodeReviewSettings {
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();

        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(": ") else {
                continue;
            };
            if key.is_empty() || key.contains(char::is_whitespace) {
                continue;
            }
            entries
                .entry(key.to_string())
                .or_insert_with(|| value.trim().to_string());
        }

        CodeReviewSettings { entries }
    }

    /// Value for `key`, if present and non-empty
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
