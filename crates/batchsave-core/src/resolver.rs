//! Resolver interface for turning remote source keys into fetchable URLs.
//!
//! The engine only depends on this trait; it does not know how keys map onto a
//! storage bucket, CDN or signed-URL service.

/// Maps a source key to a URL. Must be deterministic and free of side effects.
pub trait UrlResolver: Send + Sync {
    fn resolve(&self, source_key: &str) -> String;
}

impl<F> UrlResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve(&self, source_key: &str) -> String {
        self(source_key)
    }
}

/// Joins source keys onto a base URL, percent-encoding each key segment.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    base: url::Url,
}

impl BaseUrlResolver {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let mut base = url::Url::parse(base)
            .map_err(|e| anyhow::anyhow!("invalid base URL '{}': {}", base, e))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base URL '{}' cannot have paths appended", base);
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }
}

impl UrlResolver for BaseUrlResolver {
    fn resolve(&self, source_key: &str) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(source_key.split('/').filter(|s| !s.is_empty()));
        }
        url.to_string()
    }
}

/// Identity resolver: the source key already is a URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectUrlResolver;

impl UrlResolver for DirectUrlResolver {
    fn resolve(&self, source_key: &str) -> String {
        source_key.to_string()
    }
}
