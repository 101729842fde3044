//! Bracketed placeholder tokens.
//!
//! Tokens such as `[City]` or `[Phone]` are replaced in a single left-to-right
//! pass. A replaced value is never rescanned, so values that themselves look
//! like tokens stay literal.

use std::collections::HashMap;

use crate::context::SubstitutionContext;

/// Every token the engine knows how to fill.
pub const BUILTIN_TOKENS: &[&str] = &[
    "[Service]",
    "[service]",
    "[City-State]",
    "[city-state]",
    "[City]",
    "[city]",
    "[CITY]",
    "[State]",
    "[state]",
    "[STATE]",
    "[State Full]",
    "[Zipcode]",
    "[City Zip Code]",
    "[Zip Codes]",
    "[Company Name]",
    "[Phone]",
    "[Email]",
    "[Address]",
    "[Canonical URL]",
];

/// Check whether `token` is one of [`BUILTIN_TOKENS`].
#[must_use]
pub fn is_builtin_token(token: &str) -> bool {
    BUILTIN_TOKENS.contains(&token)
}

/// Check whether `token` has the `[...]` shape of a placeholder.
#[must_use]
pub fn is_bracketed_token(token: &str) -> bool {
    token.len() > 2
        && token.starts_with('[')
        && token.ends_with(']')
        && !token[1..token.len() - 1].contains(['[', ']'])
}

/// Token → value table for one render.
#[derive(Debug, Default)]
pub struct Placeholders {
    values: HashMap<String, String>,
    max_token_len: usize,
}

impl Placeholders {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for a context.
    ///
    /// Missing optional values are rendered as `fallback`. Each alias maps an
    /// extra token to the value of a built-in one; aliases to unknown targets
    /// are skipped.
    #[must_use]
    pub fn for_context(
        ctx: &SubstitutionContext,
        fallback: &str,
        aliases: &[(String, String)],
    ) -> Self {
        let or_fallback = |value: Option<&String>| -> String {
            value.map_or_else(|| fallback.to_owned(), Clone::clone)
        };

        let mut table = Self::new();
        table.insert("[Service]", ctx.service_name.clone());
        table.insert("[service]", ctx.service_name.to_lowercase());
        table.insert(
            "[City-State]",
            format!("{}, {}", ctx.city_name, ctx.state_abbr),
        );
        table.insert(
            "[city-state]",
            format!(
                "{}, {}",
                ctx.city_name.to_lowercase(),
                ctx.state_abbr.to_lowercase()
            ),
        );
        table.insert("[City]", ctx.city_name.clone());
        table.insert("[city]", ctx.city_name.to_lowercase());
        table.insert("[CITY]", ctx.city_name.to_uppercase());
        table.insert("[State]", ctx.state_abbr.clone());
        table.insert("[state]", ctx.state_abbr.to_lowercase());
        table.insert("[STATE]", ctx.state_abbr.to_uppercase());
        table.insert("[State Full]", or_fallback(ctx.state_full_name.as_ref()));
        table.insert("[Zipcode]", or_fallback(ctx.primary_zip.as_ref()));
        table.insert("[City Zip Code]", or_fallback(ctx.primary_zip.as_ref()));
        table.insert("[Zip Codes]", ctx.joined_zip_codes());
        table.insert("[Company Name]", or_fallback(ctx.business.name.as_ref()));
        table.insert("[Phone]", or_fallback(ctx.business.phone.as_ref()));
        table.insert("[Email]", or_fallback(ctx.business.email.as_ref()));
        table.insert("[Address]", or_fallback(ctx.business.address.as_ref()));
        table.insert("[Canonical URL]", or_fallback(ctx.canonical_url.as_ref()));

        for (alias, target) in aliases {
            if let Some(value) = table.values.get(target).cloned() {
                table.insert(alias.clone(), value);
            }
        }

        table
    }

    /// Register a token and its value, replacing any earlier value.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        self.max_token_len = self.max_token_len.max(token.len());
        self.values.insert(token, value.into());
    }

    /// Value of a token.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Replace every known token in `text`.
    ///
    /// Unknown bracketed text is copied unchanged.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        if self.values.is_empty() || !text.contains('[') {
            return text.to_owned();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('[') {
            out.push_str(&rest[..open]);
            let candidate = &rest[open..];

            match self.match_token(candidate) {
                Some((len, value)) => {
                    out.push_str(value);
                    rest = &candidate[len..];
                }
                None => {
                    out.push('[');
                    rest = &candidate[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Match a token at the start of `candidate` (which begins with `[`).
    fn match_token<'a>(&'a self, candidate: &str) -> Option<(usize, &'a str)> {
        let window = &candidate.as_bytes()[..candidate.len().min(self.max_token_len)];
        let close = window.iter().position(|b| *b == b']')?;
        let token = &candidate[..=close];
        self.get(token).map(|value| (token.len(), value))
    }

    /// Number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no token is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
