use {
    super::Service,
    crate::{
        api::RestError,
        bid::entities,
        kernel::deadline::with_deadline,
    },
};

pub struct SetBidStatusInput {
    pub bid_id: entities::BidId,
    pub status: entities::BidStatus,
}

impl Service {
    /// Sets the status of a bid. Only PUBLISHED and CANCELED can be set directly, the other
    /// statuses are the result of decisions.
    #[tracing::instrument(
        skip_all,
        fields(bid_id = input.bid_id, status = %input.status),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn set_bid_status(&self, input: SetBidStatusInput) -> Result<entities::Bid, RestError> {
        match input.status {
            entities::BidStatus::Published | entities::BidStatus::Canceled => {}
            status => {
                return Err(RestError::BadParameters(format!(
                    "bid status can not be set to {}",
                    status
                )))
            }
        }

        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let bid = tx
                .update_bid_status(input.bid_id, input.status)
                .await?
                .ok_or(RestError::BidNotFound)?;
            tx.commit().await?;
            Ok(bid)
        })
        .await
    }
}
