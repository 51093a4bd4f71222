use {
    super::{
        ensure_bid_permission,
        Service,
    },
    crate::{
        api::RestError,
        bid::entities,
        kernel::{
            deadline::with_deadline,
            versioning,
        },
    },
};

pub struct EditBidInput {
    pub bid_id:   entities::BidId,
    pub username: String,
    pub changes:  entities::BidChanges,
}

impl Service {
    #[tracing::instrument(skip_all, fields(bid_id = input.bid_id), err(level = tracing::Level::TRACE))]
    pub async fn edit_bid(&self, input: EditBidInput) -> Result<entities::Bid, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            ensure_bid_permission(tx.as_mut(), input.bid_id, &input.username).await?;
            let bid = versioning::edit::<entities::Bid, _>(tx.as_mut(), input.bid_id, input.changes)
                .await?;
            tx.commit().await?;
            Ok(bid)
        })
        .await
    }
}
