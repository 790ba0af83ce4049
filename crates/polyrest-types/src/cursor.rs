//! Pagination cursor.

use derive_more::{Display, From, Into};

/// Query parameter that carries the continuation token inside `next_url`.
pub const CURSOR_PARAM: &str = "cursor=";

/// Opaque continuation token for the next page of a paginated fetch.
///
/// The token has no meaning beyond being passed back to the API verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Into)]
pub struct Cursor(String);

impl Cursor {
    /// Extracts the cursor from a `next_url`.
    ///
    /// Everything after the last `cursor=` is the token. Returns `None` when the
    /// URL has no cursor or the token is blank, which means there are no more
    /// pages.
    ///
    /// # Example
    ///
    /// ```
    /// use polyrest_types::Cursor;
    ///
    /// let cursor = Cursor::from_next_url("https://x/y?other=1&cursor=ABC").unwrap();
    /// assert_eq!(cursor.as_str(), "ABC");
    /// assert!(Cursor::from_next_url("https://x/y?cursor=").is_none());
    /// ```
    #[must_use]
    pub fn from_next_url(next_url: &str) -> Option<Self> {
        let (_, token) = next_url.rsplit_once(CURSOR_PARAM)?;
        if token.trim().is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
