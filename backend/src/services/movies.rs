//! Movie commands and queries.

use pagination::{Page, PageRequest, PaginationConfig};
use tracing::info;

use crate::domain::{
    Error, Movie, MovieDetails, MovieFilter, MovieId, MovieQuery, MovieUpdate, NewMovie,
    RequestCoalescer, RequestSignature,
};
use crate::outbound::persistence::{DbContext, DbPool, DieselListingQueries, DieselMovieRepository};

use super::page_query;

/// Movie service.
#[derive(Debug, Clone)]
pub struct MovieService<Q = DieselListingQueries> {
    query: Q,
    pagination: PaginationConfig,
    movies: DieselMovieRepository,
    listings: RequestCoalescer<Page<Movie>>,
}

impl MovieService {
    /// Create a service listing through `pool`.
    pub fn new(pool: DbPool, pagination: PaginationConfig) -> Self {
        Self::with_query(DieselListingQueries::new(pool), pagination)
    }
}

impl<Q: MovieQuery> MovieService<Q> {
    /// Create a service listing through `query`.
    pub fn with_query(query: Q, pagination: PaginationConfig) -> Self {
        Self {
            query,
            pagination,
            movies: DieselMovieRepository::new(),
            listings: RequestCoalescer::new(),
        }
    }

    /// Create a movie with its genres and cast.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for invalid input, NotFound for unknown genres or
    /// stars, and Internal for store failures.
    pub async fn create(&self, ctx: &mut DbContext, movie: &NewMovie) -> Result<MovieDetails, Error> {
        movie.validate()?;
        let created = self.movies.create(ctx, movie).await?;
        info!(movie_id = %created.movie.id, "movie created");
        Ok(created)
    }

    /// Fetch a movie with genres and cast.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the movie is missing or deleted.
    pub async fn get(&self, ctx: &mut DbContext, id: MovieId) -> Result<MovieDetails, Error> {
        self.movies.get_by_id(ctx, id).await
    }

    /// List a page of movies. Identical concurrent listings share one query.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list(&self, filter: MovieFilter, request: PageRequest) -> Result<Page<Movie>, Error> {
        let params = request.normalize(&self.pagination);
        let mut path = format!("/api/movies?{}", page_query(params));
        if let Some(star_id) = filter.star_id {
            path.push_str(&format!("&star_id={star_id}"));
        }
        if let Some(term) = filter.search_term.as_deref() {
            path.push_str(&format!("&q={term}"));
        }
        let signature = RequestSignature::new("GET", &path);

        self.listings
            .run(&signature, || self.query.list_movies(&filter, params))
            .await
    }

    /// Update a movie's fields, genres and cast under optimistic concurrency.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for invalid input, NotFound when the movie (or a
    /// referenced genre or star) is missing, and VersionMismatch when
    /// `update.version` is stale.
    pub async fn update(
        &self,
        ctx: &mut DbContext,
        id: MovieId,
        update: &MovieUpdate,
    ) -> Result<MovieDetails, Error> {
        update.validate()?;
        let updated = self.movies.update(ctx, id, update).await?;
        info!(movie_id = %id, version = updated.version, "movie updated");
        Ok(updated)
    }

    /// Soft-delete a movie.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the movie is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: MovieId) -> Result<(), Error> {
        self.movies.delete(ctx, id).await?;
        info!(movie_id = %id, "movie deleted");
        Ok(())
    }
}
