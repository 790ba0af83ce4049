//! Cursor-driven pagination.
//!
//! [`paginate`] turns a page-fetching function into a lazy stream of items.
//! Pages are fetched one at a time, only when the consumer has drained the
//! previous one, and each page's cursor feeds the next request.

use futures::stream::{self, Stream};
use polyrest_types::{Cursor, Envelope, PolyrestError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Where the next page comes from.
#[derive(Debug)]
enum Next {
    /// No page fetched yet.
    Start,
    /// Continue from this cursor.
    Cursor(Cursor),
    /// The sequence is finished.
    End,
}

struct PageState<T, F> {
    fetch: F,
    cancel: CancellationToken,
    max_pages: u32,
    pages: u32,
    items: std::vec::IntoIter<T>,
    next: Next,
}

/// Streams every item of a paginated sequence.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's cursor afterwards. The stream:
///
/// - yields the items of each page in order, skipping pages whose count is 0
///   while still following their cursor;
/// - yields one error and ends when a fetch fails or returns a failed envelope;
/// - ends silently when `cancel` fires, checked before every fetch and every
///   item;
/// - yields [`PolyrestError::PageLimitExceeded`] and ends after `max_pages`
///   pages (0 disables the bound).
pub fn paginate<T, F, Fut>(
    fetch: F,
    cancel: CancellationToken,
    max_pages: u32,
) -> impl Stream<Item = Result<T>>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<Envelope<Vec<T>>>>,
{
    let state = PageState {
        fetch,
        cancel,
        max_pages,
        pages: 0,
        items: Vec::new().into_iter(),
        next: Next::Start,
    };
    stream::unfold(state, PageState::advance)
}

impl<T, F, Fut> PageState<T, F>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<Envelope<Vec<T>>>>,
{
    async fn advance(mut self) -> Option<(Result<T>, Self)> {
        loop {
            if !self.items.as_slice().is_empty() {
                if self.cancel.is_cancelled() {
                    tracing::debug!(pages = self.pages, "Pagination cancelled");
                    return None;
                }
                let item = self.items.next()?;
                return Some((Ok(item), self));
            }

            let cursor = match std::mem::replace(&mut self.next, Next::End) {
                Next::End => return None,
                Next::Start => None,
                Next::Cursor(cursor) => Some(cursor),
            };

            if self.cancel.is_cancelled() {
                tracing::debug!(pages = self.pages, "Pagination cancelled");
                return None;
            }

            if self.max_pages > 0 && self.pages >= self.max_pages {
                tracing::warn!(pages = self.pages, "Page limit reached, stopping pagination");
                let err = PolyrestError::PageLimitExceeded { pages: self.pages };
                return Some((Err(err), self));
            }

            self.pages += 1;
            let envelope = match (self.fetch)(cursor).await {
                Ok(envelope) => envelope,
                Err(PolyrestError::Cancelled) => {
                    tracing::debug!(pages = self.pages, "Pagination cancelled");
                    return None;
                }
                Err(err) => return Some((Err(err), self)),
            };

            let page = match envelope.classify() {
                Ok(page) => page,
                Err(err) => return Some((Err(PolyrestError::Api(err)), self)),
            };

            tracing::debug!(
                page = self.pages,
                count = page.count.unwrap_or(0),
                has_next = page.cursor.is_some(),
                "Fetched page"
            );

            if page.has_items() {
                self.items = page.value.unwrap_or_default().into_iter();
            }
            match page.cursor {
                Some(cursor) => self.next = Next::Cursor(cursor),
                None => tracing::info!(pages = self.pages, "Pagination complete"),
            }
        }
    }
}
