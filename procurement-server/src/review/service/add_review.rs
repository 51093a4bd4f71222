use {
    super::Service,
    crate::{
        api::RestError,
        identity::resolver::has_tender_permission,
        kernel::deadline::with_deadline,
        review::entities,
    },
};

pub struct AddReviewInput {
    pub review: entities::ReviewCreate,
}

impl Service {
    /// Stores feedback on a bid.
    ///
    /// The reviewer must have a permission on one of the bids of the tender the bid belongs to.
    #[tracing::instrument(
        skip_all,
        fields(bid_id = input.review.bid_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn add_review(&self, input: AddReviewInput) -> Result<entities::Review, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let review = input.review;

            let bid = tx
                .get_bid(review.bid_id)
                .await?
                .ok_or(RestError::BidNotFound)?;
            if !has_tender_permission(tx.as_mut(), bid.tender_id, &review.username).await? {
                return Err(RestError::Forbidden(format!(
                    "user {} can not leave feedback on bid {}",
                    review.username, review.bid_id
                )));
            }

            let created = tx.add_review(&review).await?;
            tx.commit().await?;
            tracing::info!(review_id = created.id, "Review added");
            Ok(created)
        })
        .await
    }
}
