//! Driving ports for catalog listing reads.
//!
//! Services coalesce listings through these traits so the read path can be
//! exercised without a store. The returned futures are not required to be
//! `Send`; pipelined Diesel loads cannot always prove it.

use async_trait::async_trait;
use pagination::{Page, PageParams};

use super::{Error, Genre, Movie, MovieFilter, Review, ReviewFilter, Star};

/// Paged movie listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait MovieQuery: Send + Sync {
    /// Fetch one page of live movies matching `filter`.
    async fn list_movies(&self, filter: &MovieFilter, params: PageParams) -> Result<Page<Movie>, Error>;
}

/// Paged review listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait ReviewQuery: Send + Sync {
    /// Fetch one page of live reviews matching `filter`.
    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        params: PageParams,
    ) -> Result<Page<Review>, Error>;
}

/// Paged star listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait StarQuery: Send + Sync {
    async fn list_stars(&self, params: PageParams) -> Result<Page<Star>, Error>;
}

/// Full genre vocabulary.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait GenreQuery: Send + Sync {
    async fn list_genres(&self) -> Result<Vec<Genre>, Error>;
}
