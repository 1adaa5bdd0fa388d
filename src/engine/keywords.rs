//! Design keyword extraction and the per-session project memory built on it.

use std::collections::{BTreeSet, VecDeque};

const KEY_DESIGN_WORDS: &[&str] = &[
    "minimal", "modern", "clean", "elegant", "simple", "sleek", "professional", "portfolio",
    "website", "landing", "dashboard", "app", "blog", "store", "e-commerce", "ecommerce", "saas",
    "startup", "business", "corporate", "responsive", "mobile", "desktop", "ui", "ux", "interface",
    "design", "dark", "light", "colorful", "creative", "artistic", "bold",
];

/// Most keywords taken from a single message.
const MAX_KEYWORDS: usize = 3;

/// Extract up to three known design keywords, in order of appearance.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized
        .split_whitespace()
        .filter(|word| KEY_DESIGN_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// Keyword sets kept in project memory; older turns are forgotten.
const MEMORY_CAPACITY: usize = 5;

/// Keywords from the most recent turns of one conversation.
#[derive(Debug, Clone, Default)]
pub struct ProjectMemory {
    recent: VecDeque<Vec<String>>,
}

impl ProjectMemory {
    /// Record this turn's keywords. Returns true when any of them was
    /// mentioned in one of the remembered turns. Turns without keywords are
    /// not stored.
    pub fn remember(&mut self, keywords: &[String]) -> bool {
        let recalled = keywords
            .iter()
            .any(|k| self.recent.iter().any(|turn| turn.contains(k)));
        if !keywords.is_empty() {
            if self.recent.len() == MEMORY_CAPACITY {
                self.recent.pop_front();
            }
            self.recent.push_back(keywords.to_vec());
        }
        recalled
    }

    /// Distinct remembered keywords.
    pub fn keywords(&self) -> BTreeSet<&str> {
        self.recent.iter().flatten().map(String::as_str).collect()
    }
}
