//! Marker-driven pagination over list APIs.
//!
//! Every IAM list call returns one page of items plus an optional `Marker`.
//! A present marker means another page is waiting; an absent (or empty) one
//! ends the listing. The helpers here turn a single-page fetch closure into a
//! lazy stream of pages so callers never hand-roll the cursor loop.

use std::future::Future;

use anyhow::Result;
use futures::{stream, Stream, TryStreamExt};

/// One page of a listing and the marker that continues it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub marker: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, marker: Option<String>) -> Self {
        Self { items, marker }
    }

    /// A page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, marker: None }
    }
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily fetch pages until the listing stops handing back a marker.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's marker afterwards. Nothing is requested until the stream is polled,
/// and an error ends the stream.
pub fn pages<T, F, Fut>(fetch: F) -> impl Stream<Item = Result<Vec<T>>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    stream::try_unfold((fetch, Cursor::Start), |(mut fetch, cursor)| async move {
        let marker = match cursor {
            Cursor::Start => None,
            Cursor::Next(marker) => Some(marker),
            Cursor::Done => return Ok(None),
        };

        let page = fetch(marker).await?;
        let next = match page.marker {
            Some(marker) if !marker.is_empty() => Cursor::Next(marker),
            _ => Cursor::Done,
        };
        Ok::<_, anyhow::Error>(Some((page.items, (fetch, next))))
    })
}

/// Drain every page, concatenating items in page order.
pub async fn collect_pages<T, F, Fut>(fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    pages(fetch).try_concat().await
}

/// Walk pages until an item satisfies `predicate`; later pages are never fetched.
pub async fn find_in_pages<T, F, Fut, P>(fetch: F, mut predicate: P) -> Result<Option<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
    P: FnMut(&T) -> bool,
{
    let mut pages = std::pin::pin!(pages(fetch));
    while let Some(items) = pages.try_next().await? {
        if let Some(found) = items.into_iter().find(|item| predicate(item)) {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
