use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::Url;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://[^\s"'()<>]+"#)
        .expect("URL pattern is valid")
});

/// Replaces every URL in `message` with `scheme://host/***`.
///
/// RPC URLs frequently carry credentials in their path or userinfo, so any
/// message that may reach a log line or a payload goes through here first.
/// Candidates that do not parse as a URL lose everything after the scheme.
pub fn sanitize_urls(message: &str) -> String {
    URL_PATTERN
        .replace_all(message, |caps: &Captures| {
            let candidate = &caps[0];
            match Url::parse(candidate) {
                Ok(url) => match url.host_str() {
                    Some(host) => format!("{}://{}/***", url.scheme(), host),
                    None => format!("{}://***", url.scheme()),
                },
                Err(_) => format!("{}://***", &caps["scheme"]),
            }
        })
        .into_owned()
}

/// Returns `scheme://host/***` for a single URL, used in log lines.
pub fn redact_url(url: &str) -> String {
    sanitize_urls(url)
}
