use {
    crate::{
        api::RestError,
        kernel::{
            db::{
                map_db_error,
                PgTransaction,
            },
            entities::OrganizationId,
        },
        review::entities,
        tender::entities::TenderId,
    },
    axum::async_trait,
    sqlx::FromRow,
    tracing::instrument,
};

#[derive(Clone, Debug, FromRow)]
pub struct Review {
    pub id:              i32,
    pub bid_id:          i32,
    pub username:        String,
    pub organization_id: i32,
    pub comment:         String,
}

impl From<Review> for entities::Review {
    fn from(review: Review) -> Self {
        entities::Review {
            id:              review.id,
            bid_id:          review.bid_id,
            username:        review.username,
            organization_id: review.organization_id,
            comment:         review.comment,
        }
    }
}

#[async_trait]
pub trait ReviewTable: Send {
    async fn add_review(
        &mut self,
        review: &entities::ReviewCreate,
    ) -> Result<entities::Review, RestError>;
    /// Reviews on the bids of the tender created by `author_username` for the organization.
    async fn get_reviews(
        &mut self,
        tender_id: TenderId,
        author_username: &str,
        organization_id: OrganizationId,
    ) -> Result<Vec<entities::Review>, RestError>;
}

#[async_trait]
impl ReviewTable for PgTransaction {
    #[instrument(
        target = "metrics",
        name = "db_add_review",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_review",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_review(
        &mut self,
        review: &entities::ReviewCreate,
    ) -> Result<entities::Review, RestError> {
        let row = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (bid_id, username, organization_id, comment) VALUES ($1, $2, $3, $4) \
             RETURNING id, bid_id, username, organization_id, comment",
        )
        .bind(review.bid_id)
        .bind(&review.username)
        .bind(review.organization_id)
        .bind(&review.comment)
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("insert review"))?;
        Ok(row.into())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_reviews",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_reviews",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_reviews(
        &mut self,
        tender_id: TenderId,
        author_username: &str,
        organization_id: OrganizationId,
    ) -> Result<Vec<entities::Review>, RestError> {
        let rows = sqlx::query_as::<_, Review>(
            "SELECT reviews.id, reviews.bid_id, reviews.username, reviews.organization_id, reviews.comment \
             FROM reviews JOIN bid ON reviews.bid_id = bid.id \
             WHERE bid.tender_id = $1 AND bid.creator_username = $2 AND bid.organization_id = $3 \
             ORDER BY reviews.id ASC",
        )
        .bind(tender_id)
        .bind(author_username)
        .bind(organization_id)
        .fetch_all(&mut *self.0)
        .await
        .map_err(map_db_error("get reviews"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
