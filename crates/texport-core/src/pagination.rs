//! Lazy offset/limit pagination over list endpoints.

use serde_json::Value;

use crate::error::Result;

/// Hard cap on items per page; larger requested limits are silently capped.
pub const MAX_PAGE_SIZE: u64 = 200;

/// One page as reported by the server.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Value>,
    pub total: u64,
}

impl Page {
    /// Maps a raw list response onto the `{items, total}` page shape.
    /// `items_key` names the array field (endpoints differ: `items`,
    /// `findings`, ...); a missing field reads as an empty page.
    pub fn from_value(value: &Value, items_key: &str) -> Page {
        let items = value
            .get(items_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let total = value.get("total").and_then(Value::as_u64).unwrap_or(0);
        Page { items, total }
    }
}

/// Demand-driven traversal over an offset/limit endpoint.
///
/// Holds only the fetch operation and the capped limit; every call to
/// [`iter`](Paginator::iter) starts a fresh traversal with its own cursor,
/// so traversals are independent and restartable.
pub struct Paginator<F> {
    limit: u64,
    fetch: F,
}

impl<F> Paginator<F>
where
    F: Fn(u64, u64) -> Result<Page>,
{
    pub fn new(limit: u64, fetch: F) -> Self {
        Self {
            limit: limit.min(MAX_PAGE_SIZE),
            fetch,
        }
    }

    /// Page size actually used against the endpoint.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Starts a traversal from offset 0. No page is fetched until the
    /// first item is demanded, and no page is fetched beyond what the
    /// consumer actually pulls.
    pub fn iter(&self) -> PageIter<'_, F> {
        PageIter {
            paginator: self,
            offset: 0,
            current: Vec::new().into_iter(),
            done: false,
        }
    }
}

/// One in-progress traversal; the cursor lives here and is discarded with
/// the iterator.
pub struct PageIter<'a, F> {
    paginator: &'a Paginator<F>,
    offset: u64,
    current: std::vec::IntoIter<Value>,
    done: bool,
}

impl<F> Iterator for PageIter<'_, F>
where
    F: Fn(u64, u64) -> Result<Page>,
{
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            let page = match (self.paginator.fetch)(self.offset, self.paginator.limit) {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            // An empty page stops the traversal even when `total` claims
            // more data; otherwise an inconsistent total would loop forever.
            let empty = page.items.is_empty();
            self.offset += self.paginator.limit;
            if empty || self.offset >= page.total {
                self.done = true;
            }
            self.current = page.items.into_iter();
        }
    }
}
