//! Paged scans
//!
//! [`Pages`] turns the store's segmented query into an iterator that issues
//! one request per `next()` call. There is never more than one request in
//! flight, and dropping the iterator stops the scan.

use crate::table::{ContinuationToken, Result, TableStore};
use sagastore_core::{Filter, PropertyBag};

/// Lazy sequence of pages of a table scan
pub struct Pages<'a, S: TableStore + ?Sized> {
    store: &'a S,
    table: &'a str,
    filter: Option<Filter>,
    page_size: usize,
    token: Option<ContinuationToken>,
    done: bool,
}

impl<'a, S: TableStore + ?Sized> Pages<'a, S> {
    /// Scan `table` from the beginning
    pub fn new(store: &'a S, table: &'a str, filter: Option<Filter>, page_size: usize) -> Self {
        Self {
            store,
            table,
            filter,
            page_size,
            token: None,
            done: false,
        }
    }
}

impl<S: TableStore + ?Sized> Iterator for Pages<'_, S> {
    type Item = Result<Vec<PropertyBag>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let segment = match self.store.query_segmented(
            self.table,
            self.filter.as_ref(),
            self.page_size,
            self.token.as_ref(),
        ) {
            Ok(segment) => segment,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.token = segment.continuation;
        if self.token.is_none() {
            self.done = true;
        }
        Some(Ok(segment.rows))
    }
}
