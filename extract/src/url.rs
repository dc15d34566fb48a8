//! URL normalization for discovered operations.

use std::sync::LazyLock;

use regex::Regex;

static REPEATED_PROTOCOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)+(https?://)").expect("static regex must compile")
});

/// Substitutes `base_url` for every `placeholder` occurrence, then collapses
/// repeated protocol prefixes.
///
/// A slash is not doubled at the join: when the text after a placeholder
/// starts with `/`, a trailing `/` on the base URL is dropped. With no base
/// URL or an empty placeholder, only the protocol collapse applies.
///
/// # Examples
///
/// ```
/// use amis_contract_extract::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("${baseUrl}/api/orders", "${baseUrl}", Some("http://10.0.0.5:8080/")),
///     "http://10.0.0.5:8080/api/orders"
/// );
/// assert_eq!(
///     normalize_url("http://${baseUrl}/x", "${baseUrl}", Some("http://host")),
///     "http://host/x"
/// );
/// assert_eq!(normalize_url("/api/orders", "${baseUrl}", None), "/api/orders");
/// ```
pub fn normalize_url(url: &str, placeholder: &str, base_url: Option<&str>) -> String {
    let substituted = match base_url {
        Some(base) if !placeholder.is_empty() && url.contains(placeholder) => {
            substitute(url, placeholder, base)
        }
        _ => url.to_string(),
    };
    REPEATED_PROTOCOL
        .replace_all(substituted.trim(), "$1")
        .into_owned()
}

fn substitute(url: &str, placeholder: &str, base: &str) -> String {
    let mut parts = url.split(placeholder);
    let mut out = parts.next().unwrap_or_default().to_string();
    for rest in parts {
        if rest.starts_with('/') {
            out.push_str(base.trim_end_matches('/'));
        } else {
            out.push_str(base);
        }
        out.push_str(rest);
    }
    out
}
