//! Review commands and queries.

use pagination::{Page, PageRequest, PaginationConfig};
use tracing::info;

use crate::domain::{
    Error, NewReview, RequestCoalescer, RequestSignature, Review, ReviewFilter, ReviewId,
    ReviewQuery, ReviewUpdate, UserId,
};
use crate::outbound::persistence::{DbContext, DbPool, DieselListingQueries, DieselReviewRepository};

use super::page_query;

/// Review service.
#[derive(Debug, Clone)]
pub struct ReviewService<Q = DieselListingQueries> {
    query: Q,
    pagination: PaginationConfig,
    reviews: DieselReviewRepository,
    listings: RequestCoalescer<Page<Review>>,
}

impl ReviewService {
    /// Create a service listing through `pool`.
    pub fn new(pool: DbPool, pagination: PaginationConfig) -> Self {
        Self::with_query(DieselListingQueries::new(pool), pagination)
    }
}

impl<Q: ReviewQuery> ReviewService<Q> {
    /// Create a service listing through `query`.
    pub fn with_query(query: Q, pagination: PaginationConfig) -> Self {
        Self {
            query,
            pagination,
            reviews: DieselReviewRepository::new(),
            listings: RequestCoalescer::new(),
        }
    }

    /// Post a review; the movie's average rating is refreshed in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for invalid input, NotFound for an unknown movie or
    /// author, and AlreadyExists when the author already reviewed the movie.
    pub async fn create(&self, ctx: &mut DbContext, review: &NewReview) -> Result<Review, Error> {
        review.validate()?;
        let created = self.reviews.create(ctx, review).await?;
        info!(
            review_id = %created.id,
            movie_id = %created.movie_id,
            user_id = %created.user_id,
            "review created"
        );
        Ok(created)
    }

    /// Fetch a review.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the review is missing or deleted.
    pub async fn get(&self, ctx: &mut DbContext, id: ReviewId) -> Result<Review, Error> {
        self.reviews.get_by_id(ctx, id).await
    }

    /// List a page of reviews by movie and/or author.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list(&self, filter: ReviewFilter, request: PageRequest) -> Result<Page<Review>, Error> {
        let params = request.normalize(&self.pagination);
        let mut path = format!("/api/reviews?{}", page_query(params));
        if let Some(movie_id) = filter.movie_id() {
            path.push_str(&format!("&movie_id={movie_id}"));
        }
        if let Some(user_id) = filter.user_id() {
            path.push_str(&format!("&user_id={user_id}"));
        }
        let signature = RequestSignature::new("GET", &path);

        self.listings
            .run(&signature, || self.query.list_reviews(&filter, params))
            .await
    }

    /// Edit the author's own review.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for invalid input, NotFound when the review is
    /// missing, and Forbidden when `user_id` is not the author.
    pub async fn update(
        &self,
        ctx: &mut DbContext,
        id: ReviewId,
        user_id: UserId,
        update: &ReviewUpdate,
    ) -> Result<Review, Error> {
        update.validate()?;
        let updated = self.reviews.update(ctx, id, user_id, update).await?;
        info!(review_id = %id, movie_id = %updated.movie_id, "review updated");
        Ok(updated)
    }

    /// Delete the author's own review.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the review is missing and Forbidden when
    /// `user_id` is not the author.
    pub async fn delete(&self, ctx: &mut DbContext, id: ReviewId, user_id: UserId) -> Result<(), Error> {
        self.reviews.delete(ctx, id, user_id).await?;
        info!(review_id = %id, user_id = %user_id, "review deleted");
        Ok(())
    }
}
