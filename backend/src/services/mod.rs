//! Application services over the catalog repositories.
//!
//! Services validate inputs, normalize page requests against the configured
//! [`pagination::PaginationConfig`], and record committed mutations in the
//! log. Commands take the caller's [`DbContext`] so several of them can share
//! one transaction scope. Listing reads are routed through a per-endpoint
//! [`RequestCoalescer`] into a listing port such as [`MovieQuery`], which
//! by default reads on a context of its own.
//!
//! [`DbContext`]: crate::outbound::persistence::DbContext
//! [`RequestCoalescer`]: crate::domain::RequestCoalescer
//! [`MovieQuery`]: crate::domain::MovieQuery

mod genres;
mod movies;
mod reviews;
mod stars;
mod users;

pub use genres::GenreService;
pub use movies::MovieService;
pub use reviews::ReviewService;
pub use stars::StarService;
pub use users::UserService;

use pagination::PageParams;

/// Canonical query string of a page request.
fn page_query(params: PageParams) -> String {
    format!("page={}&size={}", params.page(), params.size())
}

#[cfg(test)]
mod tests;
