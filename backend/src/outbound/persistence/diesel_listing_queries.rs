//! Listing ports backed by the Diesel repositories.
//!
//! Each read checks out its own pooled connection; listings never join a
//! caller's transaction.

use async_trait::async_trait;
use pagination::{Page, PageParams};

use crate::domain::{
    Error, Genre, GenreQuery, Movie, MovieFilter, MovieQuery, Review, ReviewFilter, ReviewQuery,
    Star, StarQuery,
};

use super::{
    DbContext, DbPool, DieselGenreRepository, DieselMovieRepository, DieselReviewRepository,
    DieselStarRepository,
};

/// Diesel-backed implementation of every listing port.
#[derive(Debug, Clone)]
pub struct DieselListingQueries {
    pool: DbPool,
}

impl DieselListingQueries {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn context(&self) -> DbContext {
        DbContext::new(self.pool.clone())
    }
}

#[async_trait(?Send)]
impl MovieQuery for DieselListingQueries {
    async fn list_movies(&self, filter: &MovieFilter, params: PageParams) -> Result<Page<Movie>, Error> {
        let mut ctx = self.context();
        DieselMovieRepository::new().list(&mut ctx, filter, params).await
    }
}

#[async_trait(?Send)]
impl ReviewQuery for DieselListingQueries {
    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        params: PageParams,
    ) -> Result<Page<Review>, Error> {
        let mut ctx = self.context();
        DieselReviewRepository::new().list(&mut ctx, filter, params).await
    }
}

#[async_trait(?Send)]
impl StarQuery for DieselListingQueries {
    async fn list_stars(&self, params: PageParams) -> Result<Page<Star>, Error> {
        let mut ctx = self.context();
        DieselStarRepository::new().list(&mut ctx, params).await
    }
}

#[async_trait(?Send)]
impl GenreQuery for DieselListingQueries {
    async fn list_genres(&self) -> Result<Vec<Genre>, Error> {
        let mut ctx = self.context();
        DieselGenreRepository::new().list_all(&mut ctx).await
    }
}
