//! Deterministic template substitution for geosite.
//!
//! Rewrites one shared HTML template into a city-specific page:
//!
//! - [`SubstitutionEngine`]: The render pipeline (protect, spintax, placeholders, restore)
//! - [`SubstitutionContext`]: Per-request values (service, city, state, zips, business)
//! - [`SeedCache`]: Process-wide spintax seeds keyed by `"{city}|{state}"`
//! - [`Placeholders`]: Single-pass `[Token]` replacement
//! - [`ProtectedBlocks`]: `<script>`/`<style>` extraction and restoration
//!
//! Rendering is deterministic: the same text and context always produce the
//! same output, across calls and across process restarts.

mod context;
mod engine;
mod placeholders;
mod protect;
mod spintax;
mod twister;

pub use context::{BusinessInfo, SubstitutionContext};
pub use engine::{DEFAULT_FALLBACK, SubstitutionEngine};
pub use placeholders::{BUILTIN_TOKENS, Placeholders, is_bracketed_token, is_builtin_token};
pub use protect::{ProtectedBlocks, StructuredBlock};
pub use spintax::{SeedCache, resolve_spintax, seed_for_key};

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SubstitutionEngine: Send, Sync);
    assert_impl_all!(SeedCache: Send, Sync);
}
