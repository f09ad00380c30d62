//! Resolution of stored upload paths into viewable URLs
//!
//! The backend stores whatever path the upload handler produced: sometimes a
//! bare file name, sometimes an absolute server path, sometimes a Windows path
//! with backslashes, and occasionally an already-public URL. Only the final
//! segment is meaningful for the public `/uploads/` route.

/// Builds public URLs for uploaded documents and receipts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    host: String,
}

impl AssetResolver {
    /// Create a resolver for an asset host such as `https://example.com`
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            host: host.trim().trim_end_matches('/').to_string(),
        }
    }

    /// The host URLs are resolved against
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// URL of a registration document under `/uploads/`
    ///
    /// Absolute `http://` or `https://` URLs are returned unchanged; empty
    /// values resolve to `None`.
    #[must_use]
    pub fn document_url(&self, stored: &str) -> Option<String> {
        self.resolve(stored, "uploads")
    }

    /// URL of a payment receipt under `/uploads/receipts/`
    #[must_use]
    pub fn receipt_url(&self, stored: &str) -> Option<String> {
        self.resolve(stored, "uploads/receipts")
    }

    fn resolve(&self, stored: &str, route: &str) -> Option<String> {
        let stored = stored.trim();
        if stored.is_empty() {
            return None;
        }
        if is_absolute_url(stored) {
            return Some(stored.to_string());
        }
        let name = final_segment(stored)?;
        Some(format!(
            "{}/{route}/{}",
            self.host,
            urlencoding::encode(name)
        ))
    }
}

fn is_absolute_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Last segment of a `/` or `\` delimited path, if non-empty
#[must_use]
pub fn final_segment(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}
