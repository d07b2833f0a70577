//! URL validation and canonicalization.
//!
//! The canonical form is the lookup key for mappings, so two spellings of the
//! same address must normalize to the same string.

use url::Url;

/// Longest canonical URL that can be stored, matching the `original_url` column width.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Normalizes a URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is trimmed
/// 2. **Protocol**: Only HTTP and HTTPS are allowed; scheme is lower-cased
/// 3. **Hostname**: Converted to lowercase
/// 4. **Path**: `.` and `..` segments are resolved, case is preserved;
///    an absent path stays absent (`https://example.com` has no trailing `/`)
/// 5. **Port**: Kept whenever the input states one, including the scheme's default
/// 6. **User info, query, fragment**: Preserved as written
///
/// # Errors
///
/// Returns [`UrlNormalizationError::Empty`] for blank input.
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
/// Returns [`UrlNormalizationError::MissingHost`] when no host is present.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("  HTTPS://EXAMPLE.COM  ").unwrap(),
///     "https://example.com"
/// );
///
/// assert_eq!(
///     normalize_url("https://Example.com/a/./b/../Page?Q=1#Top").unwrap(),
///     "https://example.com/a/Page?Q=1#Top"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let url =
        Url::parse(trimmed).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlNormalizationError::MissingHost)?;

    let mut canonical = String::with_capacity(trimmed.len());
    canonical.push_str(url.scheme());
    canonical.push_str("://");

    if !url.username().is_empty() || url.password().is_some() {
        canonical.push_str(url.username());
        if let Some(password) = url.password() {
            canonical.push(':');
            canonical.push_str(password);
        }
        canonical.push('@');
    }

    canonical.push_str(&host.to_ascii_lowercase());

    // `port()` hides the scheme's default port, so `:443` is only visible in the raw text.
    let port = match url.port() {
        Some(port) => Some(port),
        None if has_explicit_port(trimmed) => url.port_or_known_default(),
        None => None,
    };

    if let Some(port) = port {
        canonical.push(':');
        canonical.push_str(&port.to_string());
    }

    if has_explicit_path(trimmed) {
        canonical.push_str(url.path());
    }

    if let Some(query) = url.query() {
        canonical.push('?');
        canonical.push_str(query);
    }

    if let Some(fragment) = url.fragment() {
        canonical.push('#');
        canonical.push_str(fragment);
    }

    Ok(canonical)
}

/// Returns true if `url` would be accepted by [`normalize_url`].
pub fn is_valid_http_url(url: &str) -> bool {
    normalize_url(url).is_ok()
}

/// Raw text from the start of the authority to the end of the input.
///
/// Only called once the scheme is known to be http(s), so the first `:`
/// always ends the scheme.
fn authority_onward(raw: &str) -> &str {
    let after_scheme = raw.split_once(':').map_or(raw, |(_, rest)| rest);
    after_scheme.trim_start_matches(['/', '\\'])
}

/// Checks whether the raw input carries a path after its authority.
///
/// The parser always reports at least `/` for http(s), so the raw text is
/// the only place the distinction survives.
fn has_explicit_path(raw: &str) -> bool {
    let rest = authority_onward(raw);

    rest.find(['/', '\\', '?', '#'])
        .is_some_and(|i| matches!(rest.as_bytes()[i], b'/' | b'\\'))
}

/// Checks whether the raw authority states a non-empty port.
fn has_explicit_port(raw: &str) -> bool {
    let rest = authority_onward(raw);
    let authority = &rest[..rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len())];
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    // IPv6 literals carry colons of their own
    let after_host = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split_once(']').map_or("", |(_, tail)| tail),
        None => host_port,
    };

    after_host
        .split_once(':')
        .is_some_and(|(_, port)| !port.is_empty())
}
