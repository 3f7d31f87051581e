// ── Address resolver ──
//
// Pure helpers over the loose address strings node attributes carry:
// full URLs, `host:port`, or bracketed `[ipv6]:port`. Scheme-ful input
// goes through the `url` crate; anything it rejects falls back to a
// permissive colon-split so malformed input degrades instead of failing.

use url::Url;

/// Extract the host portion of a URL or `host:port` string.
///
/// IPv6 brackets are stripped from the result. Returns `None` for empty
/// or hostless input.
pub fn extract_host(address: &str) -> Option<String> {
    if address.is_empty() {
        return None;
    }

    // Ensure a scheme so the URL parser accepts bare host:port strings.
    let candidate = if address.contains("://") {
        address.to_owned()
    } else {
        format!("http://{address}")
    };

    match Url::parse(&candidate) {
        Ok(url) => url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_owned()),
        Err(_) => fallback_host(address),
    }
}

/// Extract the port token of a URL or `host:port` string.
///
/// Only purely-numeric tokens are accepted; a URL without an explicit
/// port yields `None`.
pub fn extract_port(address: &str) -> Option<String> {
    if address.is_empty() {
        return None;
    }

    if address.contains("://") {
        return match Url::parse(address) {
            Ok(url) => url.port().map(|p| p.to_string()),
            Err(_) => fallback_port(address),
        };
    }

    fallback_port(address)
}

/// Wrap an IPv6 literal in brackets so it can prefix a `:port` suffix.
/// Already-bracketed hosts and IPv4/DNS names pass through unchanged.
pub fn bracket_if_ipv6(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    }
}

// ── Permissive fallbacks ────────────────────────────────────────────

fn fallback_host(address: &str) -> Option<String> {
    // Bracketed IPv6 literal: take what's inside the brackets.
    if let Some(rest) = address.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            let host = &rest[..end];
            return (!host.is_empty()).then(|| host.to_owned());
        }
    }

    let host = address.split(':').next().unwrap_or_default();
    (!host.is_empty()).then(|| host.to_owned())
}

fn fallback_port(address: &str) -> Option<String> {
    let idx = address.rfind(':')?;
    let token = &address[idx + 1..];
    (!token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .then(|| token.to_owned())
}
