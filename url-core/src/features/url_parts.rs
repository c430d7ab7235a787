//! URL decomposition
//!
//! Two independent views of the same string:
//!
//! - [`UrlParts`]: generic split into scheme / netloc / path / query /
//!   fragment. The netloc is kept verbatim (credentials and port included).
//! - [`DomainParts`]: lenient host extraction followed by a public-suffix
//!   split into subdomain / domain / suffix.
//!
//! The views are not reconciled. Lexical features read whichever one their
//! definition names, and the trained model was fit against exactly these
//! (sometimes disagreeing) answers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Schemes whose last path segment may carry `;params`
const PARAM_SCHEMES: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtsps",
    "rtspu", "sip", "sips", "mms", "sftp", "tel",
];

/// Dotted-quad with per-octet range check
static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$")
        .expect("static regex")
});

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

fn is_c0_or_space(c: char) -> bool {
    c <= ' '
}

// ============================================================================
// GENERIC SPLIT
// ============================================================================

/// Generic URL components
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// Lower-cased scheme, empty when absent
    pub scheme: String,
    pub netloc: String,
    pub path: String,
    pub params: String,
    pub query: String,
    pub fragment: String,
}

impl UrlParts {
    /// Split a URL. Never fails; malformed input yields empty components.
    pub fn parse(url: &str) -> Self {
        let cleaned: String = url
            .trim_start_matches(is_c0_or_space)
            .chars()
            .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
            .collect();

        let mut parts = UrlParts::default();
        let mut rest = cleaned.as_str();

        if let Some(colon) = rest.find(':') {
            let candidate = &rest[..colon];
            let starts_alpha = candidate
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic());
            if starts_alpha && candidate.chars().all(is_scheme_char) {
                parts.scheme = candidate.to_ascii_lowercase();
                rest = &rest[colon + 1..];
            }
        }

        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            parts.netloc = after[..end].to_string();
            rest = &after[end..];
        }

        if let Some((before, fragment)) = rest.split_once('#') {
            parts.fragment = fragment.to_string();
            rest = before;
        }

        if let Some((before, query)) = rest.split_once('?') {
            parts.query = query.to_string();
            rest = before;
        }

        if PARAM_SCHEMES.contains(&parts.scheme.as_str()) && rest.contains(';') {
            let (path, params) = split_params(rest);
            parts.path = path.to_string();
            parts.params = params.to_string();
        } else {
            parts.path = rest.to_string();
        }

        parts
    }

    /// Port carried by the netloc
    ///
    /// `None` when absent, empty, non-numeric or out of range.
    pub fn port(&self) -> Option<u16> {
        let hostinfo = self
            .netloc
            .rsplit_once('@')
            .map(|(_, host)| host)
            .unwrap_or(&self.netloc);

        let port = match hostinfo.split_once('[') {
            Some((_, bracketed)) => bracketed.split_once(']')?.1.split_once(':')?.1,
            None => hostinfo.split_once(':')?.1,
        };

        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        port.parse().ok()
    }
}

/// Split `;params` off the last path segment
fn split_params(path: &str) -> (&str, &str) {
    let search_from = path.rfind('/').unwrap_or(0);
    match path[search_from..].find(';') {
        Some(offset) => {
            let i = search_from + offset;
            (&path[..i], &path[i + 1..])
        }
        None => (path, ""),
    }
}

// ============================================================================
// REGISTRABLE SPLIT
// ============================================================================

/// Public-suffix view of the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    /// Known public suffix, empty when the host has none
    pub suffix: String,
}

impl DomainParts {
    /// Extract host leniently (scheme optional) and split on the public suffix
    pub fn parse(url: &str) -> Self {
        let host = lenient_host(url);
        Self::from_host(&host)
    }

    pub fn from_host(host: &str) -> Self {
        let host = host.replace(['\u{3002}', '\u{ff0e}', '\u{ff61}'], ".");

        if host.len() >= 4 && host.starts_with('[') && host.ends_with(']') {
            return Self {
                domain: host,
                ..Default::default()
            };
        }

        let labels: Vec<&str> = host.split('.').collect();
        let suffix_labels = known_suffix_labels(&host);
        let suffix_index = labels.len() - suffix_labels.min(labels.len());

        if suffix_labels == 0 && labels.len() == 4 && IPV4_PATTERN.is_match(&host) {
            return Self {
                domain: host,
                ..Default::default()
            };
        }

        Self {
            subdomain: if suffix_index >= 2 {
                labels[..suffix_index - 1].join(".")
            } else {
                String::new()
            },
            domain: if suffix_index > 0 {
                labels[suffix_index - 1].to_string()
            } else {
                String::new()
            },
            suffix: labels[suffix_index..].join("."),
        }
    }
}

/// Number of trailing labels forming a known ICANN public suffix
///
/// Private registry entries (e.g. `github.io`) are skipped in favour of the
/// ICANN suffix beneath them.
fn known_suffix_labels(host: &str) -> usize {
    let lowered = host.to_ascii_lowercase();
    let mut candidate = lowered.as_str();

    loop {
        let Some(suffix) = psl::suffix(candidate.as_bytes()) else {
            return 0;
        };
        if !suffix.is_known() {
            return 0;
        }

        let suffix_len = suffix.as_bytes().len();
        if suffix.typ() != Some(psl::Type::Private) {
            return suffix.as_bytes().iter().filter(|&&b| b == b'.').count() + 1;
        }

        // Drop the leftmost label of the private suffix and retry
        let private = &candidate[candidate.len() - suffix_len..];
        match private.split_once('.') {
            Some((_, parent)) => candidate = &candidate[candidate.len() - parent.len()..],
            None => return 0,
        }
    }
}

/// Host portion of a possibly scheme-less URL
fn lenient_host(url: &str) -> String {
    let url = url.trim();
    let schemeless = strip_scheme(url);

    let end = schemeless.find(['/', '?', '#']).unwrap_or(schemeless.len());
    let authority = &schemeless[..end];
    let after_userinfo = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);

    if after_userinfo.starts_with('[') {
        if let Some((inner, _)) = after_userinfo.split_once(']') {
            return format!("{inner}]");
        }
    }

    let hostname = after_userinfo
        .split_once(':')
        .map(|(host, _)| host)
        .unwrap_or(after_userinfo)
        .trim();

    hostname
        .trim_end_matches(['.', '\u{3002}', '\u{ff0e}', '\u{ff61}'])
        .to_string()
}

fn strip_scheme(url: &str) -> &str {
    match url.find("//") {
        Some(0) => &url[2..],
        Some(i)
            if i >= 2
                && url[..i].ends_with(':')
                && url[..i - 1].chars().all(is_scheme_char) =>
        {
            &url[i + 2..]
        }
        _ => url,
    }
}
