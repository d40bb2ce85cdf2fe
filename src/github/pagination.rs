// Link header pagination.
// Parses RFC 8288 style `Link` headers and rebases links onto the API base.

use reqwest::Url;
use reqwest::header::{HeaderMap, LINK};

use crate::error::{FinderError, Result};

/// A single link from a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub href: String,
    pub rel: String,
}

/// Parse one `Link` header value into its links.
/// Entries without a target or a `rel` parameter are skipped.
pub fn parse_link_header(value: &str) -> Vec<PageLink> {
    let mut links = Vec::new();

    for entry in split_unquoted(value, ',') {
        // The target may itself contain `;` or `,`, so cut it out before
        // looking at parameters.
        let Some((href, params)) = entry
            .strip_prefix('<')
            .and_then(|rest| rest.split_once('>'))
        else {
            continue;
        };

        for param in split_unquoted(params, ';') {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if !name.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            // rel may hold several space-separated relation types
            for rel in value.trim().trim_matches('"').split_whitespace() {
                links.push(PageLink {
                    href: href.to_string(),
                    rel: rel.to_string(),
                });
            }
        }
    }

    links
}

/// Find the `next` link across all `Link` headers of a response.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_link_header)
        .find(|link| link.rel == "next")
        .map(|link| link.href)
}

/// Turn an absolute pagination link into a path relative to `base`.
///
/// Relative links are resolved against `base` first. Links that do not live
/// under `base` are rejected.
pub fn relative_to_base(base: &Url, href: &str) -> Result<String> {
    let absolute = base
        .join(href)
        .map_err(|e| FinderError::InvalidUrl(format!("{}: {}", href, e)))?;

    absolute
        .as_str()
        .strip_prefix(base.as_str())
        .map(str::to_string)
        .ok_or_else(|| FinderError::ForeignLink {
            link: href.to_string(),
        })
}

/// Split on `delim` where it is not inside `<...>` or quotes.
fn split_unquoted(value: &str, delim: char) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_target = false;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quotes => in_target = true,
            '>' if !in_quotes => in_target = false,
            '"' if !in_target => in_quotes = !in_quotes,
            c if c == delim && !in_target && !in_quotes => {
                entries.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(value[start..].trim());

    entries.into_iter().filter(|e| !e.is_empty()).collect()
}
