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
            entities::Version,
            versioning,
        },
    },
};

pub struct RollbackBidInput {
    pub bid_id:   entities::BidId,
    pub username: String,
    pub version:  Version,
}

impl Service {
    /// Restores the bid stored for `version`, including the version number, and drops the
    /// history recorded after it.
    #[tracing::instrument(
        skip_all,
        fields(bid_id = input.bid_id, version = input.version),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn rollback_bid(&self, input: RollbackBidInput) -> Result<entities::Bid, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            ensure_bid_permission(tx.as_mut(), input.bid_id, &input.username).await?;
            let bid =
                versioning::rollback::<entities::Bid, _>(tx.as_mut(), input.bid_id, input.version)
                    .await?;
            tx.commit().await?;
            Ok(bid)
        })
        .await
    }
}
