//! Request construction: URL joining, header defaults, credential
//! forwarding, and cache policy selection.
//!
//! # Design
//! Inbound cookies travel as an explicit [`AuthContext`] passed into every
//! call site; nothing here reads ambient request state, so the data flow is
//! visible at each call. `build_request` takes everything by reference and
//! clones what it keeps — caller-supplied options and headers are never
//! mutated.

use crate::cache::CacheDirective;
use crate::http::{ApiRequest, HttpMethod};

/// The set of cookies forwarded to the upstream API.
///
/// Cookies are forwarded opaquely as `name=value` pairs; this layer never
/// inspects or constructs the session credential itself. Order is preserved
/// so the serialized header is stable.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    cookies: Vec<(String, String)>,
}

impl AuthContext {
    /// A context with no credentials. Requests built against it carry no
    /// `cookie` header at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_cookie(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut ctx = Self::default();
        ctx.insert(name, value);
        ctx
    }

    /// Add or replace a cookie by name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    /// Record the cookie from a `set-cookie` response header value,
    /// ignoring attributes after the first `;`.
    pub fn apply_set_cookie(&mut self, header_value: &str) {
        let pair = header_value.split(';').next().unwrap_or_default();
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                self.insert(name, value.trim());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Serialize the cookie set into a single header value, `name=value`
    /// pairs joined by `"; "`. `None` when there is nothing to forward;
    /// an empty `cookie` header is never sent.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Per-call options recognized by the access layer.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Forward the ambient session cookie. Defaults to true; public
    /// endpoints tolerate the extra header, so only callers that must not
    /// send credentials turn this off.
    pub authenticated: bool,
    /// Revalidation interval in seconds. Marks the request cacheable.
    pub revalidate: Option<u64>,
    /// Invalidation tags attached to the cached response.
    pub tags: Vec<String>,
    /// Explicit cache directive, honored verbatim when present.
    pub cache: Option<CacheDirective>,
    /// Extra request headers. Later entries do not override the computed
    /// `accept`/`cookie` headers.
    pub headers: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            authenticated: true,
            revalidate: None,
            tags: Vec::new(),
            cache: None,
            headers: Vec::new(),
        }
    }
}

impl FetchOptions {
    pub fn revalidate(seconds: u64) -> Self {
        Self {
            revalidate: Some(seconds),
            ..Self::default()
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_cache(mut self, directive: CacheDirective) -> Self {
        self.cache = Some(directive);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Join `path` onto `base`, or pass an absolute URL through verbatim.
/// The result always has exactly one `/` at the join point.
pub fn build_url(base: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn is_absolute(path: &str) -> bool {
    let scheme_matches = |prefix: &str| {
        path.len() >= prefix.len() && path[..prefix.len()].eq_ignore_ascii_case(prefix)
    };
    scheme_matches("http:") || scheme_matches("https:")
}

/// Turn a path plus call options into a fully-specified request.
pub fn build_request(
    base_url: &str,
    method: HttpMethod,
    path: &str,
    body: Option<String>,
    auth: &AuthContext,
    options: &FetchOptions,
) -> ApiRequest {
    let url = build_url(base_url, path);

    let mut headers = options.headers.clone();
    set_header(&mut headers, "accept", "application/json");

    if body.is_some() && !has_header(&headers, "content-type") {
        headers.push(("content-type".to_string(), "application/json".to_string()));
    }

    if options.authenticated {
        if let Some(cookie) = auth.cookie_header() {
            set_header(&mut headers, "cookie", cookie);
        }
    }

    let cache = CacheDirective::select(options.cache.clone(), options.revalidate, &options.tags);

    ApiRequest {
        method,
        url,
        headers,
        body,
        cache,
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: impl Into<String>) {
    let value = value.into();
    match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value,
        None => headers.push((name.to_string(), value)),
    }
}
