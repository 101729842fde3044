//! Text helpers shared by the resolver and the link builder.

/// Turn a display name into a hostname fragment: lowercase, spaces to hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Title-case a name for display.
///
/// Every letter that follows a non-letter is uppercased and every other letter
/// is lowercased, so `"o'fallon"` becomes `"O'Fallon"` and `"NEW YORK"` becomes
/// `"New York"`.
#[must_use]
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_is_letter = false;

    for c in name.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

/// Canonical URL of a page: `"{scheme}://{host}{path}"`.
///
/// A trailing slash is dropped unless the path is `/` itself.
#[must_use]
pub fn canonical_url(scheme: &str, host: &str, path: &str) -> String {
    let path = if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };
    format!("{scheme}://{host}{path}")
}

/// Check whether text contains template-language syntax the evaluator handles.
#[must_use]
pub fn has_template_syntax(text: &str) -> bool {
    text.contains("{{") || text.contains("{%")
}

/// Insert a canonical `<link>` before `</head>`.
///
/// Nothing happens when the document has no `<head>` or already declares a
/// canonical link.
#[must_use]
pub fn insert_canonical_link(html: &str, url: &str) -> Option<String> {
    if !html.contains("<head>") || html.contains("rel=\"canonical\"") || !html.contains("</head>")
    {
        return None;
    }
    let link = format!("<link rel=\"canonical\" href=\"{url}\" />\n</head>");
    Some(html.replacen("</head>", &link, 1))
}
