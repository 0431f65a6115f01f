//! Sparse per-language text records.
//!
//! A menu item's name or description is stored as one `MultiLangText`. A
//! missing key means "not translated yet"; blank strings are treated the same
//! way when looking for usable content.

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiLangText(BTreeMap<Language, String>);

impl MultiLangText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, replacing any existing entry.
    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.0.insert(language, text.into());
        self
    }

    /// Insert or replace an entry. Returns the previous value, if any.
    pub fn insert(&mut self, language: Language, text: impl Into<String>) -> Option<String> {
        self.0.insert(language, text.into())
    }

    /// Exact lookup, blank values included.
    pub fn get(&self, language: Language) -> Option<&str> {
        self.0.get(&language).map(String::as_str)
    }

    /// Look up `language`, falling back to English and then to the first
    /// non-blank entry in registry order.
    pub fn get_or_fallback(&self, language: Language) -> Option<&str> {
        self.non_blank(language)
            .or_else(|| self.non_blank(Language::canonical()))
            .or_else(|| {
                self.source_language()
                    .and_then(|source| self.non_blank(source))
            })
    }

    /// Whether `language` has non-blank content.
    pub fn has(&self, language: Language) -> bool {
        self.non_blank(language).is_some()
    }

    /// Targets that still need a translation, in caller order without
    /// duplicates.
    pub fn missing(&self, targets: &[Language]) -> Vec<Language> {
        let mut missing = Vec::new();
        for &target in targets {
            if !self.has(target) && !missing.contains(&target) {
                missing.push(target);
            }
        }
        missing
    }

    /// The language to translate from: English when it has content,
    /// otherwise the first non-blank entry in registry order.
    pub fn source_language(&self) -> Option<Language> {
        let canonical = Language::canonical();
        if self.has(canonical) {
            return Some(canonical);
        }

        self.0
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(lang, _)| *lang)
            .min_by_key(|lang| lang.registry_rank())
    }

    /// Copy entries from `translations` for languages in `allowed` only.
    ///
    /// Languages that already hold non-blank content are never replaced.
    /// Returns how many entries were written.
    pub fn merge_missing<'a, I>(&mut self, translations: I, allowed: &[Language]) -> usize
    where
        I: IntoIterator<Item = (&'a Language, &'a String)>,
    {
        let mut merged = 0;
        for (lang, text) in translations {
            if !allowed.contains(lang) || self.has(*lang) || text.trim().is_empty() {
                continue;
            }
            self.0.insert(*lang, text.clone());
            merged += 1;
        }
        merged
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
        self.0.iter().map(|(lang, text)| (*lang, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn non_blank(&self, language: Language) -> Option<&str> {
        self.get(language).filter(|text| !text.trim().is_empty())
    }
}

impl FromIterator<(Language, String)> for MultiLangText {
    fn from_iter<T: IntoIterator<Item = (Language, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
