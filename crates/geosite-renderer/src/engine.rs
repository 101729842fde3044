//! Substitution pipeline.

use std::sync::Arc;

use crate::context::SubstitutionContext;
use crate::placeholders::{Placeholders, is_builtin_token};
use crate::protect::ProtectedBlocks;
use crate::spintax::{SeedCache, resolve_spintax};

/// Literal used for missing context values unless configured otherwise.
pub const DEFAULT_FALLBACK: &str = "N/A";

/// Rewrites template text for one city.
///
/// Stages run in a fixed order:
///
/// 1. Script and style elements are swapped for markers. JSON-LD scripts keep
///    their inner text for stage 4.
/// 2. Spintax spans are resolved with the seed of the context's city and state.
/// 3. Placeholder tokens are replaced.
/// 4. JSON-LD inner text gets placeholder replacement (no spintax) and every
///    block is put back.
///
/// Output depends only on the input text, the context and the engine's
/// configuration.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use geosite_renderer::{SeedCache, SubstitutionContext, SubstitutionEngine};
///
/// let engine = SubstitutionEngine::new(Arc::new(SeedCache::new()));
/// let ctx = SubstitutionContext::new("Plumbing", "Austin", "TX");
///
/// let html = engine.render("<h1>[Service] in [City-State]</h1>", &ctx);
/// assert_eq!(html, "<h1>Plumbing in Austin, TX</h1>");
/// ```
#[derive(Debug)]
pub struct SubstitutionEngine {
    seeds: Arc<SeedCache>,
    fallback: String,
    aliases: Vec<(String, String)>,
}

impl SubstitutionEngine {
    /// Create an engine sharing the given seed cache.
    #[must_use]
    pub fn new(seeds: Arc<SeedCache>) -> Self {
        Self {
            seeds,
            fallback: DEFAULT_FALLBACK.to_owned(),
            aliases: Vec::new(),
        }
    }

    /// Set the literal used for missing context values.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Register extra tokens, each mapped to a built-in token.
    #[must_use]
    pub fn with_aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (alias, target) in aliases {
            let (alias, target) = (alias.into(), target.into());
            if !is_builtin_token(&target) {
                tracing::warn!(%alias, %target, "Placeholder alias target is not a built-in token");
            }
            self.aliases.push((alias, target));
        }
        self
    }

    /// Shared seed cache.
    #[must_use]
    pub fn seeds(&self) -> &Arc<SeedCache> {
        &self.seeds
    }

    /// Fallback literal for missing values.
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Rewrite `text` for `ctx`.
    #[must_use]
    pub fn render(&self, text: &str, ctx: &SubstitutionContext) -> String {
        let (masked, blocks) = ProtectedBlocks::extract(text);

        let seed = self.seeds.seed(&ctx.seed_key());
        let spun = resolve_spintax(&masked, seed);

        let placeholders = Placeholders::for_context(ctx, &self.fallback, &self.aliases);
        let replaced = placeholders.apply(&spun);

        tracing::trace!(
            raw_blocks = blocks.raw_count(),
            structured_blocks = blocks.structured_count(),
            "Rendered substitution"
        );

        blocks.restore(&replaced, |inner| placeholders.apply(inner))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::BusinessInfo;

    fn engine() -> SubstitutionEngine {
        SubstitutionEngine::new(Arc::new(SeedCache::new()))
    }

    fn austin() -> SubstitutionContext {
        let mut ctx = SubstitutionContext::new("Plumbing", "Austin", "TX");
        ctx.state_full_name = Some("Texas".to_owned());
        ctx.business = BusinessInfo {
            name: Some("Acme".to_owned()),
            ..BusinessInfo::default()
        };
        ctx
    }

    #[test]
    fn test_render_is_deterministic() {
        let text = "<p>{Fast|Quick|Speedy} [Service] in [City]. {Call|Ring} [Phone].</p>";

        let first = engine().render(text, &austin());
        let second = engine().render(text, &austin());

        assert_eq!(first, second);
    }

    #[test]
    fn test_spintax_and_city_token() {
        assert_eq!(engine().render("{A|B} [City]", &austin()), "A Austin");
    }

    #[test]
    fn test_spintax_varies_by_city_key_only() {
        let engine = engine();
        let text = "{1|2|3|4|5|6|7|8|9|10}";
        let mut dallas = austin();
        dallas.city_name = "Dallas".to_owned();

        assert_eq!(engine.render(text, &austin()), engine.render(text, &austin()));
        assert_eq!(
            engine.render(text, &dallas),
            resolve_spintax(text, crate::spintax::seed_for_key("Dallas|TX"))
        );
    }

    #[test]
    fn test_script_and_style_untouched() {
        let text = "<script>var s = '{A|B} [City]';</script>\
                    <style>.x{color:red|blue}</style>[City]";

        let output = engine().render(text, &austin());

        assert_eq!(
            output,
            "<script>var s = '{A|B} [City]';</script>\
             <style>.x{color:red|blue}</style>Austin"
        );
    }

    #[test]
    fn test_custom_script_element_is_rewritten() {
        let text = "<script-card>[City]</script-card><script>x</script>";

        assert_eq!(
            engine().render(text, &austin()),
            "<script-card>Austin</script-card><script>x</script>"
        );
    }

    #[test]
    fn test_json_ld_gets_placeholders_but_no_spintax() {
        let text = r#"<script type="application/ld+json">{"name": "[Company Name]", "x": "{A|B}"}</script>"#;

        let output = engine().render(text, &austin());

        assert_eq!(
            output,
            r#"<script type="application/ld+json">{"name": "Acme", "x": "{A|B}"}</script>"#
        );
    }

    #[test]
    fn test_fallback_and_aliases() {
        let engine = engine()
            .with_fallback("-")
            .with_aliases([("[Business]", "[Company Name]")]);

        assert_eq!(
            engine.render("[Business] [Email] [State Full]", &austin()),
            "Acme - Texas"
        );
        assert_eq!(engine.fallback(), "-");
    }

    #[test]
    fn test_template_syntax_survives() {
        let text = "{{ city|upper }} {% for c in cities %}{{ c }}{% endfor %}";

        assert_eq!(engine().render(text, &austin()), text);
    }

    #[test]
    fn test_seed_cache_shared() {
        let seeds = Arc::new(SeedCache::new());
        let engine = SubstitutionEngine::new(Arc::clone(&seeds));

        let _ = engine.render("{a|b}", &austin());

        assert_eq!(seeds.len(), 1);
        assert!(Arc::ptr_eq(engine.seeds(), &seeds));
    }

    #[test]
    fn test_malformed_spintax_is_left_alone() {
        assert_eq!(engine().render("{A|B [City]", &austin()), "{A|B Austin");
    }
}
