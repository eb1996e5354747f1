//! Service behaviour that does not need a live database.
//!
//! The pool points at a closed port, so every store call fails with an
//! internal error after a short checkout timeout. Listing reads are also
//! driven through mocked query ports.

use std::time::Duration;

use chrono::NaiveDate;
use pagination::{Page, PageRequest, PaginationConfig};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{ErrorCode, MovieFilter, NewMovie, NewReview, Rating, ReviewFilter};
use crate::domain::ports::{MockGenreQuery, MockMovieQuery, MockReviewQuery, MockStarQuery};
use crate::domain::{Error, Genre, GenreId, MovieId, StarDraft, StarId, UserId};
use crate::outbound::persistence::{DbContext, DbPool, PoolConfig};

#[fixture]
fn unreachable_pool() -> DbPool {
    DbPool::new_lazy(
        &PoolConfig::new("postgres://catalog@127.0.0.1:1/catalog")
            .with_min_idle(None)
            .with_connection_timeout(Duration::from_millis(300)),
    )
}

#[rstest]
fn page_query_uses_normalized_values() {
    let params = PageRequest::new(0, 500).normalize(&PaginationConfig::default());
    assert_eq!(page_query(params), "page=1&size=100");
}

#[rstest]
#[tokio::test]
async fn invalid_movie_is_rejected_before_the_store(unreachable_pool: DbPool) {
    let service = MovieService::new(unreachable_pool.clone(), PaginationConfig::default());
    let mut ctx = DbContext::new(unreachable_pool);
    let movie = NewMovie {
        title: "   ".to_owned(),
        release_date: NaiveDate::from_ymd_opt(1999, 3, 31).expect("valid date"),
        description: String::new(),
        genres: vec![],
        cast: vec![],
    };

    let err = service.create(&mut ctx, &movie).await.expect_err("blank title");

    assert_eq!(err.code(), ErrorCode::BadRequest);
}

#[rstest]
#[tokio::test]
async fn short_review_content_is_rejected(unreachable_pool: DbPool) {
    let service = ReviewService::new(unreachable_pool.clone(), PaginationConfig::default());
    let mut ctx = DbContext::new(unreachable_pool);
    let review = NewReview {
        movie_id: MovieId::new(1),
        user_id: UserId::new(1),
        rating: Rating::new(8).expect("valid rating"),
        title: "Great".to_owned(),
        content: "too short".to_owned(),
    };

    let err = service.create(&mut ctx, &review).await.expect_err("short content");

    assert_eq!(err.code(), ErrorCode::BadRequest);
}

#[rstest]
#[tokio::test]
async fn star_dying_before_birth_is_rejected(unreachable_pool: DbPool) {
    let service = StarService::new(unreachable_pool.clone(), PaginationConfig::default());
    let mut ctx = DbContext::new(unreachable_pool);
    let draft = StarDraft {
        first_name: "Ada".to_owned(),
        middle_name: None,
        last_name: "Lovelace".to_owned(),
        birth_date: NaiveDate::from_ymd_opt(1815, 12, 10).expect("valid date"),
        birth_place: None,
        death_date: NaiveDate::from_ymd_opt(1800, 1, 1),
        bio: None,
    };

    let err = service.create(&mut ctx, &draft).await.expect_err("invalid dates");

    assert_eq!(err.code(), ErrorCode::BadRequest);
}

#[rstest]
#[tokio::test]
async fn short_genre_name_is_rejected(unreachable_pool: DbPool) {
    let service = GenreService::new(unreachable_pool.clone());
    let mut ctx = DbContext::new(unreachable_pool);

    let err = service.create(&mut ctx, " ab ").await.expect_err("too short");

    assert_eq!(err.code(), ErrorCode::BadRequest);
}

#[rstest]
#[tokio::test]
async fn identical_concurrent_listings_share_one_failure(unreachable_pool: DbPool) {
    let service = MovieService::new(unreachable_pool, PaginationConfig::default());
    let filter = MovieFilter::default().with_search("heat");

    let (first, second) = tokio::join!(
        service.list(filter.clone(), PageRequest::new(1, 10)),
        service.list(filter.clone(), PageRequest::new(1, 10)),
    );

    let first = first.expect_err("store unreachable");
    let second = second.expect_err("store unreachable");
    assert_eq!(first.code(), ErrorCode::Internal);
    assert!(first.incident_id().is_some());
    assert_eq!(first.incident_id(), second.incident_id());
}

#[rstest]
#[tokio::test]
async fn different_listings_fail_independently(unreachable_pool: DbPool) {
    let service = ReviewService::new(unreachable_pool, PaginationConfig::default());
    let by_movie = ReviewFilter::new(Some(MovieId::new(1)), None).expect("valid filter");
    let by_user = ReviewFilter::new(None, Some(UserId::new(1))).expect("valid filter");

    let (first, second) = tokio::join!(
        service.list(by_movie, PageRequest::default()),
        service.list(by_user, PageRequest::default()),
    );

    let first = first.expect_err("store unreachable");
    let second = second.expect_err("store unreachable");
    assert_ne!(first.incident_id(), second.incident_id());
}

#[rstest]
#[tokio::test]
async fn movie_listing_forwards_filter_and_normalized_page() {
    let mut query = MockMovieQuery::new();
    query
        .expect_list_movies()
        .withf(|filter, params| {
            filter.star_id == Some(StarId::new(4))
                && filter.search_term.as_deref() == Some("heat")
                && params.page() == 1
                && params.size() == 100
        })
        .times(1)
        .returning(|_, params| Ok(Page::new(params, 0, Vec::new())));
    let service = MovieService::with_query(query, PaginationConfig::default());
    let filter = MovieFilter::default().with_star(StarId::new(4)).with_search("  heat ");

    let page = service
        .list(filter, PageRequest::new(0, 500))
        .await
        .expect("listing succeeds");

    assert_eq!((page.page, page.size, page.total), (1, 100, 0));
}

#[rstest]
#[tokio::test]
async fn review_listing_forwards_author_filter() {
    let mut query = MockReviewQuery::new();
    query
        .expect_list_reviews()
        .withf(|filter, params| {
            filter.user_id() == Some(UserId::new(7)) && filter.movie_id().is_none() && params.page() == 2
        })
        .times(1)
        .returning(|_, params| Ok(Page::new(params, 11, Vec::new())));
    let service = ReviewService::with_query(query, PaginationConfig::default());
    let filter = ReviewFilter::new(None, Some(UserId::new(7))).expect("valid filter");

    let page = service
        .list(filter, PageRequest::new(2, 5))
        .await
        .expect("listing succeeds");

    assert_eq!(page.total, 11);
    assert_eq!(page.size, 5);
}

#[rstest]
#[tokio::test]
async fn sequential_star_listings_each_query_the_store() {
    let mut query = MockStarQuery::new();
    query
        .expect_list_stars()
        .times(2)
        .returning(|params| Ok(Page::new(params, 3, Vec::new())));
    let service = StarService::with_query(query, PaginationConfig::default());

    for _ in 0..2 {
        let page = service.list(PageRequest::default()).await.expect("listing succeeds");
        assert_eq!(page.total, 3);
    }
}

#[rstest]
#[tokio::test]
async fn genre_listing_returns_vocabulary_and_propagates_failures() {
    let mut query = MockGenreQuery::new();
    let mut calls = 0;
    query.expect_list_genres().times(2).returning(move || {
        calls += 1;
        if calls == 1 {
            Ok(vec![Genre {
                id: GenreId::new(1),
                name: "Drama".to_owned(),
            }])
        } else {
            Err(Error::internal("genre scan failed"))
        }
    });
    let service = GenreService::with_query(query);

    let genres = service.list().await.expect("first listing succeeds");
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].name, "Drama");

    let err = service.list().await.expect_err("second listing fails");
    assert_eq!(err.code(), ErrorCode::Internal);
    assert!(err.incident_id().is_some());
}
