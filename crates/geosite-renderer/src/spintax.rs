//! Deterministic spintax resolution.
//!
//! A spintax span is a non-nested `{alt1|alt2|...}` group. Each span is replaced
//! by one alternative chosen by a generator seeded from the (city, state) key,
//! so the same key always yields the same text. The generator is a fixed
//! MT19937 stream, so choices also hold across releases.

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use md5::{Digest, Md5};
use regex::{Captures, Regex};

use crate::twister::Twister;

static SPAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("invalid spintax regex"));

/// Derive the seed of a spintax key.
///
/// The seed is the MD5 digest of the key read as a big-endian integer,
/// reduced modulo 2^32.
#[must_use]
pub fn seed_for_key(key: &str) -> u32 {
    let digest = Md5::digest(key.as_bytes());
    u32::from_be_bytes([digest[12], digest[13], digest[14], digest[15]])
}

/// Append-only cache of spintax seeds.
///
/// Seeds are pure functions of their key, so concurrent first insertions of
/// the same key store the same value. The write path still goes through
/// `entry().or_insert` so every caller observes the value that was stored first.
#[derive(Debug, Default)]
pub struct SeedCache {
    seeds: RwLock<HashMap<String, u32>>,
}

impl SeedCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the seed for a key, computing and storing it on first use.
    pub fn seed(&self, key: &str) -> u32 {
        {
            let seeds = self.seeds.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(seed) = seeds.get(key) {
                return *seed;
            }
        }

        let computed = seed_for_key(key);
        let mut seeds = self.seeds.write().unwrap_or_else(PoisonError::into_inner);
        *seeds.entry(key.to_owned()).or_insert(computed)
    }

    /// Number of cached keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no key has been seeded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve every spintax span in `text`.
///
/// Spans without a `|` are left alone, as are spans that belong to template
/// syntax: `{{ ... }}` expressions, `{% ... %}` statements and `{# ... #}`
/// comments. One random draw is made per resolved span, in document order.
#[must_use]
pub fn resolve_spintax(text: &str, seed: u32) -> String {
    let mut rng = Twister::new(seed);

    SPAN_PATTERN
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let inner = &caps[1];

            if !is_spintax(text, caps) {
                return whole.to_owned();
            }

            let options: Vec<&str> = inner.split('|').collect();
            let choice = rng.below(options.len());
            options[choice].to_owned()
        })
        .into_owned()
}

fn is_spintax(text: &str, caps: &Captures<'_>) -> bool {
    let inner = &caps[1];
    if !inner.contains('|') || inner.starts_with('%') || inner.starts_with('#') {
        return false;
    }

    let Some(span) = caps.get(0) else {
        return false;
    };
    let opened_by_brace = text[..span.start()].ends_with('{');
    let closed_by_brace = text[span.end()..].starts_with('}');
    !(opened_by_brace && closed_by_brace)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_seed_for_key_is_stable() {
        assert_eq!(seed_for_key("Austin|TX"), seed_for_key("Austin|TX"));
        assert_ne!(seed_for_key("Austin|TX"), seed_for_key("austin|TX"));
    }

    #[test]
    fn test_seed_for_key_uses_low_digest_bytes() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(seed_for_key(""), 0xecf8_427e);
    }

    #[test]
    fn test_seed_cache_converges() {
        let cache = SeedCache::new();
        assert!(cache.is_empty());

        let first = cache.seed("Austin|TX");
        let second = cache.seed("Austin|TX");

        assert_eq!(first, second);
        assert_eq!(first, seed_for_key("Austin|TX"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_seed_cache_concurrent_first_insert() {
        let cache = std::sync::Arc::new(SeedCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = std::sync::Arc::clone(&cache);
                std::thread::spawn(move || cache.seed("Boise|ID"))
            })
            .collect();

        let seeds: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(seeds.iter().all(|seed| *seed == seeds[0]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_resolve_picks_one_alternative() {
        let output = resolve_spintax("We are {fast|quick|speedy}.", 42);

        assert!(
            ["We are fast.", "We are quick.", "We are speedy."].contains(&output.as_str()),
            "unexpected output: {output}"
        );
    }

    #[test]
    fn test_resolve_choices_are_pinned() {
        let seed = seed_for_key("Austin|TX");
        assert_eq!(seed, 0x6b1b_dd49);

        assert_eq!(
            resolve_spintax("{1|2|3|4|5|6|7|8|9|10} {a|b|c|d}", seed),
            "1 d"
        );
        assert_eq!(
            resolve_spintax(
                "We offer {fast|quick|speedy} {roof|roofing} {repair|repairs|service} in Austin.",
                seed
            ),
            "We offer fast roofing repairs in Austin."
        );
        assert_eq!(resolve_spintax("We are {fast|quick|speedy}.", 42), "We are speedy.");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let text = "{A|B|C} and {D|E|F} then {G|H}";
        let seed = seed_for_key("Denver|CO");

        assert_eq!(resolve_spintax(text, seed), resolve_spintax(text, seed));
    }

    #[test]
    fn test_span_without_pipe_is_kept() {
        assert_eq!(resolve_spintax("{single}", 1), "{single}");
        assert_eq!(resolve_spintax("{\"a\": 1}", 1), "{\"a\": 1}");
    }

    #[test]
    fn test_template_syntax_is_kept() {
        let text = "{{ name|upper }} {% if a|length %}x{% endif %} {# a|b #}";
        assert_eq!(resolve_spintax(text, 7), text);
    }

    #[test]
    fn test_unbalanced_braces_are_kept() {
        assert_eq!(resolve_spintax("{a|b", 3), "{a|b");
        assert_eq!(resolve_spintax("a|b}", 3), "a|b}");
    }

    #[test]
    fn test_nested_resolves_inner_only() {
        let output = resolve_spintax("{outer {a|a} x}", 5);
        assert_eq!(output, "{outer a x}");
    }

    #[test]
    fn test_empty_alternative_allowed() {
        let output = resolve_spintax("x{|}y", 9);
        assert_eq!(output, "xy");
    }
}
