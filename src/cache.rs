//! In-memory TTL cache of translation results.
//!
//! Entries are evicted lazily: an expired entry is dropped by the lookup
//! that finds it. There is no size bound.

use crate::clock::Clock;
use crate::types::TranslationRequest;
use crate::types::TranslationResult;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Default time-to-live: 24 hours
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CacheEntry {
    result: TranslationResult,
    timestamp: DateTime<Utc>,
}

/// Cache key for a request: trimmed text, source language, the sorted set
/// of target languages and the context tag.
///
/// Target order and duplicates do not matter, so `[vi, ko]` and `[ko, vi]`
/// share an entry. Glossary and formatting flags are not part of the key.
pub fn cache_key(request: &TranslationRequest) -> String {
    let mut targets: Vec<&str> = request.target_languages.iter().map(|l| l.code()).collect();
    targets.sort_unstable();
    targets.dedup();

    format!(
        "{}:{}:{}:{}",
        request.source_language,
        targets.join(","),
        request.context,
        request.text.trim()
    )
}

pub struct TranslationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TranslationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        // A clock that went backwards gives a negative age; treat it as fresh
        let age = (now - entry.timestamp).to_std().unwrap_or(Duration::ZERO);
        age > self.ttl
    }

    /// Copy of the stored result for `key`, marked `cached`, unless absent
    /// or expired.
    pub fn get(&self, key: &str) -> Option<TranslationResult> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if !self.is_expired(entry, now) => {
                let mut hit = entry.result.clone();
                hit.cached = true;
                Some(hit)
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store or overwrite `key`, stamped with the current time.
    pub fn put(&self, key: String, mut result: TranslationResult) {
        result.cached = false;
        let timestamp = self.clock.now();
        self.lock().insert(key, CacheEntry { result, timestamp });
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, expired ones included until looked up.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::i18n::Language;
    use crate::types::TranslationContext;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn request(targets: Vec<Language>) -> TranslationRequest {
        TranslationRequest::new("Espresso with oat milk", Language::ENGLISH, targets)
            .with_context(TranslationContext::MenuItem)
    }

    fn result() -> TranslationResult {
        let mut translations = BTreeMap::new();
        translations.insert(Language::KOREAN, "오트밀크 에스프레소".to_string());
        TranslationResult {
            original: "Espresso with oat milk".to_string(),
            source_language: Language::ENGLISH,
            translations,
            provider: "fake".to_string(),
            cached: false,
            cost: Some(0.01),
        }
    }

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    // ==================== Key Tests ====================

    #[test]
    fn test_key_ignores_target_order() {
        let a = cache_key(&request(vec![Language::VIETNAMESE, Language::KOREAN]));
        let b = cache_key(&request(vec![Language::KOREAN, Language::VIETNAMESE]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_trims_text() {
        let a = cache_key(&request(vec![Language::KOREAN]));
        let mut padded = request(vec![Language::KOREAN]);
        padded.text = "  Espresso with oat milk \n".to_string();
        assert_eq!(a, cache_key(&padded));
    }

    #[test]
    fn test_key_distinguishes_context_source_and_targets() {
        let base = request(vec![Language::KOREAN]);
        let key = cache_key(&base);

        let other_context = base.clone().with_context(TranslationContext::Description);
        assert_ne!(key, cache_key(&other_context));

        let mut other_source = base.clone();
        other_source.source_language = Language::ITALIAN;
        assert_ne!(key, cache_key(&other_source));

        assert_ne!(
            key,
            cache_key(&request(vec![Language::KOREAN, Language::JAPANESE]))
        );
    }

    #[test]
    fn test_key_ignores_glossary() {
        let base = request(vec![Language::KOREAN]);
        let with_glossary = base.clone().with_glossary_term("oat milk", "오트밀크");
        assert_eq!(cache_key(&base), cache_key(&with_glossary));
    }

    proptest! {
        #[test]
        fn prop_key_is_order_and_duplicate_independent(
            picks in proptest::collection::vec(0usize..20, 1..8),
            seed in any::<u64>(),
        ) {
            let all = Language::all();
            let targets: Vec<Language> = picks.iter().map(|&i| all[i % all.len()]).collect();

            let mut shuffled = targets.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();
            shuffled.push(targets[0]);

            let mut a = request(Vec::new());
            a.target_languages = targets;
            let mut b = request(Vec::new());
            b.target_languages = shuffled;

            prop_assert_eq!(cache_key(&a), cache_key(&b));
        }
    }

    // ==================== TTL Tests ====================

    #[test]
    fn test_get_before_expiry_and_miss_after() {
        let clock = manual_clock();
        let cache = TranslationCache::new(Duration::from_secs(3600), clock.clone());
        cache.put("k".to_string(), result());

        clock.advance(chrono::Duration::seconds(3599));
        let hit = cache.get("k").expect("Should hit before expiry");
        assert!(hit.cached);

        clock.advance(chrono::Duration::seconds(2));
        assert!(cache.get("k").is_none());
        // Lazily evicted on that lookup
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_at_exact_ttl_is_still_fresh() {
        let clock = manual_clock();
        let cache = TranslationCache::new(Duration::from_secs(60), clock.clone());
        cache.put("k".to_string(), result());

        clock.advance(chrono::Duration::seconds(60));
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_clock_going_backwards_keeps_entry() {
        let clock = manual_clock();
        let cache = TranslationCache::new(Duration::from_secs(60), clock.clone());
        cache.put("k".to_string(), result());

        clock.advance(chrono::Duration::seconds(-300));
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_put_overwrites_and_refreshes_timestamp() {
        let clock = manual_clock();
        let cache = TranslationCache::new(Duration::from_secs(60), clock.clone());
        cache.put("k".to_string(), result());

        clock.advance(chrono::Duration::seconds(50));
        let mut newer = result();
        newer.provider = "other".to_string();
        cache.put("k".to_string(), newer);

        clock.advance(chrono::Duration::seconds(50));
        let hit = cache.get("k").expect("Should still be cached");
        assert_eq!(hit.provider, "other");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = TranslationCache::new(DEFAULT_TTL, manual_clock());
        cache.put("a".to_string(), result());
        cache.put("b".to_string(), result());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
