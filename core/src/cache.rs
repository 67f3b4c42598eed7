//! Cache directives attached to outbound requests.
//!
//! The access layer never stores or evicts responses itself; a directive is
//! instructions for the platform cache sitting under the transport. Most
//! calls need request-time freshness (auth state, per-user ownership), so the
//! default is `NoStore`; read-heavy public listings opt into interval
//! revalidation explicitly.

/// Transport-level caching behavior for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheDirective {
    /// Always re-fetch.
    #[default]
    NoStore,
    /// Reuse a cached response for up to `seconds`, then re-fetch. Tags
    /// enable targeted eviction when related data changes.
    Revalidate { seconds: u64, tags: Vec<String> },
    /// Cache indefinitely until one of the tags is invalidated.
    Tagged { tags: Vec<String> },
}

impl CacheDirective {
    /// Pick the directive for a call: an explicit override wins verbatim, a
    /// numeric revalidation interval marks the request cacheable, anything
    /// else is never cached.
    pub fn select(
        overridden: Option<CacheDirective>,
        revalidate: Option<u64>,
        tags: &[String],
    ) -> CacheDirective {
        if let Some(directive) = overridden {
            return directive;
        }
        match revalidate {
            Some(seconds) => CacheDirective::Revalidate {
                seconds,
                tags: tags.to_vec(),
            },
            None => CacheDirective::NoStore,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        !matches!(self, CacheDirective::NoStore)
    }
}
