//! Page-at-a-time iteration over limit/offset queries.

use crate::error::DataResult;

/// Iterator fetching one page per call of `fetch(limit, offset)`.
///
/// Stops after the first empty page, and after yielding an error.
pub struct PageIter<T, F>
where
    F: FnMut(u64, u64) -> DataResult<Vec<T>>,
{
    fetch: F,
    page_size: u64,
    offset: u64,
    done: bool,
}

impl<T, F> PageIter<T, F>
where
    F: FnMut(u64, u64) -> DataResult<Vec<T>>,
{
    pub fn new(page_size: u64, fetch: F) -> Self {
        Self::starting_at(page_size, 0, fetch)
    }

    pub fn starting_at(page_size: u64, offset: u64, fetch: F) -> Self {
        Self {
            fetch,
            page_size: page_size.max(1),
            offset,
            done: false,
        }
    }

    /// Offset of the next page to fetch.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<T, F> Iterator for PageIter<T, F>
where
    F: FnMut(u64, u64) -> DataResult<Vec<T>>,
{
    type Item = DataResult<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match (self.fetch)(self.page_size, self.offset) {
            Ok(page) if page.is_empty() => {
                self.done = true;
                None
            }
            Ok(page) => {
                self.offset += self.page_size;
                Some(Ok(page))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
