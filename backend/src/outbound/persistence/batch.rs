//! Paginated batch query execution.
//!
//! A listing is two statements: the page (`ORDER BY … OFFSET … LIMIT …`) and
//! the unpaged `COUNT(*)` over the same filter. Both futures are built on the
//! same connection before either is awaited; `diesel-async` pipelines them
//! into one round trip and the results come back page first, then total.

use std::future::Future;

use diesel::QueryResult;
use futures_util::future::try_join;
use pagination::{Page, PageParams};

use crate::domain::Error;

use super::error_mapping::map_diesel_error;

/// `OFFSET` and `LIMIT` values for a normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Rows to skip.
    pub offset: i64,
    /// Rows to return.
    pub limit: i64,
}

impl PageWindow {
    /// Derive the window from normalized params.
    pub fn from_params(params: &PageParams) -> Self {
        Self {
            offset: i64::try_from(params.offset()).unwrap_or(i64::MAX),
            limit: i64::try_from(params.limit()).unwrap_or(i64::MAX),
        }
    }
}

/// Await a page query and its count query together.
///
/// # Errors
///
/// Returns an internal error if either statement fails.
pub async fn execute_batch<R, I, C>(items: I, total: C, operation: &str) -> Result<(Vec<R>, u64), Error>
where
    I: Future<Output = QueryResult<Vec<R>>>,
    C: Future<Output = QueryResult<i64>>,
{
    let (rows, count) = try_join(items, total)
        .await
        .map_err(|err| map_diesel_error(err, operation))?;
    Ok((rows, u64::try_from(count).unwrap_or_default()))
}

/// Convert fetched rows and wrap them in the response envelope.
///
/// # Errors
///
/// Propagates the first row conversion failure.
pub fn into_page<R, T, E>(params: PageParams, rows: Vec<R>, total: u64) -> Result<Page<T>, Error>
where
    T: TryFrom<R, Error = E>,
    E: Into<Error>,
{
    let items = rows
        .into_iter()
        .map(|row| T::try_from(row).map_err(Into::into))
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(Page::new(params, total, items))
}
