use {
    super::Service,
    crate::{
        api::RestError,
        bid::entities,
        kernel::deadline::with_deadline,
    },
};

pub struct GetBidInput {
    pub bid_id: entities::BidId,
}

impl Service {
    #[tracing::instrument(skip_all, fields(bid_id = input.bid_id), err(level = tracing::Level::TRACE))]
    pub async fn get_bid(&self, input: GetBidInput) -> Result<entities::Bid, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let bid = tx
                .get_bid(input.bid_id)
                .await?
                .ok_or(RestError::BidNotFound)?;
            tx.commit().await?;
            Ok(bid)
        })
        .await
    }
}
