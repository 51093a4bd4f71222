use {
    super::{
        entities,
        service::{
            add_review::AddReviewInput,
            get_reviews::GetReviewsInput,
        },
    },
    crate::{
        api::{
            require_non_empty,
            RestError,
            WrappedRouter,
        },
        state::Store,
    },
    axum::{
        extract::{
            Path,
            Query,
            State,
        },
        Json,
        Router,
    },
    procurement_api_types::{
        review::{
            GetReviewsQueryParams,
            Review,
            ReviewCreate,
            Route,
        },
        tender::TenderId,
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

/// Leave feedback on a bid.
#[utoipa::path(post, path = "/api/bids/feedback", request_body = ReviewCreate, responses(
    (status = 200, body = Review),
    (status = 400, response = ErrorBodyResponse),
    (status = 403, response = ErrorBodyResponse),
    (status = 404, description = "Bid or user was not found", body = ErrorBodyResponse),
),)]
pub async fn post_review(
    State(store): State<Arc<Store>>,
    Json(review_create): Json<ReviewCreate>,
) -> Result<Json<Review>, RestError> {
    require_non_empty("username", &review_create.username)?;
    require_non_empty("comment", &review_create.comment)?;
    let review = store
        .review_service
        .add_review(AddReviewInput {
            review: review_create.into(),
        })
        .await?;
    Ok(Json(review.into()))
}

/// List the reviews on the bids an author placed on a tender.
#[utoipa::path(get, path = "/api/bids/{id}/reviews",
    params(("id" = i32, Path, description = "Tender id"), GetReviewsQueryParams),
    responses(
    (status = 200, body = Vec<Review>),
    (status = 403, response = ErrorBodyResponse),
    (status = 404, description = "Requester was not found", body = ErrorBodyResponse),
),)]
pub async fn get_reviews(
    State(store): State<Arc<Store>>,
    Path(tender_id): Path<TenderId>,
    Query(params): Query<GetReviewsQueryParams>,
) -> Result<Json<Vec<Review>>, RestError> {
    require_non_empty("authorUsername", &params.author_username)?;
    require_non_empty("requesterUsername", &params.requester_username)?;
    let reviews = store
        .review_service
        .get_reviews(GetReviewsInput {
            tender_id,
            author_username: params.author_username,
            requester_username: params.requester_username,
            organization_id: params.organization_id,
        })
        .await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

pub fn get_routes() -> Router<Arc<Store>> {
    WrappedRouter::new()
        .route(Route::PostReview, post_review)
        .route(Route::GetReviews, get_reviews)
        .router
}

impl From<entities::Review> for Review {
    fn from(review: entities::Review) -> Self {
        Review {
            id:              review.id,
            bid_id:          review.bid_id,
            username:        review.username,
            organization_id: review.organization_id,
            comment:         review.comment,
        }
    }
}

impl From<ReviewCreate> for entities::ReviewCreate {
    fn from(review: ReviewCreate) -> Self {
        entities::ReviewCreate {
            bid_id:          review.bid_id,
            username:        review.username,
            organization_id: review.organization_id,
            comment:         review.comment,
        }
    }
}
