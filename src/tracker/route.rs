//! Public-post route matching.

use regex::Regex;
use url::Url;

use crate::error_handling::InitializationError;

/// Decides whether a page URL is a trackable public post.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    pattern: Regex,
}

impl RouteMatcher {
    /// # Errors
    ///
    /// Returns `InitializationError::RoutePatternError` if `pattern` is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, InitializationError> {
        let pattern = Regex::new(pattern).map_err(|source| InitializationError::RoutePatternError {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(RouteMatcher { pattern })
    }

    /// Matches the path of `page_url`, which may be absolute or a bare path.
    pub fn matches(&self, page_url: &str) -> bool {
        let path = match Url::parse(page_url) {
            Ok(url) => url.path().to_string(),
            Err(_) => page_url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        self.pattern.is_match(&path)
    }
}
