//! Star commands and queries.

use pagination::{Page, PageRequest, PaginationConfig};
use tracing::info;

use crate::domain::{Error, RequestCoalescer, RequestSignature, Star, StarDraft, StarId, StarQuery};
use crate::outbound::persistence::{DbContext, DbPool, DieselListingQueries, DieselStarRepository};

use super::page_query;

/// Star service.
#[derive(Debug, Clone)]
pub struct StarService<Q = DieselListingQueries> {
    query: Q,
    pagination: PaginationConfig,
    stars: DieselStarRepository,
    listings: RequestCoalescer<Page<Star>>,
}

impl StarService {
    /// Create a service listing through `pool`.
    pub fn new(pool: DbPool, pagination: PaginationConfig) -> Self {
        Self::with_query(DieselListingQueries::new(pool), pagination)
    }
}

impl<Q: StarQuery> StarService<Q> {
    /// Create a service listing through `query`.
    pub fn with_query(query: Q, pagination: PaginationConfig) -> Self {
        Self {
            query,
            pagination,
            stars: DieselStarRepository::new(),
            listings: RequestCoalescer::new(),
        }
    }

    /// Create a star.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for invalid input.
    pub async fn create(&self, ctx: &mut DbContext, draft: &StarDraft) -> Result<Star, Error> {
        draft.validate()?;
        let star = self.stars.create(ctx, draft).await?;
        info!(star_id = %star.id, "star created");
        Ok(star)
    }

    /// Fetch a star.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the star is missing or deleted.
    pub async fn get(&self, ctx: &mut DbContext, id: StarId) -> Result<Star, Error> {
        self.stars.get_by_id(ctx, id).await
    }

    /// List a page of stars.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list(&self, request: PageRequest) -> Result<Page<Star>, Error> {
        let params = request.normalize(&self.pagination);
        let signature = RequestSignature::new("GET", &format!("/api/stars?{}", page_query(params)));
        self.listings
            .run(&signature, || self.query.list_stars(params))
            .await
    }

    /// Replace a star's fields.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for invalid input and NotFound when the star is
    /// missing.
    pub async fn update(&self, ctx: &mut DbContext, id: StarId, draft: &StarDraft) -> Result<Star, Error> {
        draft.validate()?;
        let star = self.stars.update(ctx, id, draft).await?;
        info!(star_id = %id, "star updated");
        Ok(star)
    }

    /// Soft-delete a star.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the star is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: StarId) -> Result<(), Error> {
        self.stars.delete(ctx, id).await?;
        info!(star_id = %id, "star deleted");
        Ok(())
    }
}
