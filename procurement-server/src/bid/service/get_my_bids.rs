use {
    super::Service,
    crate::{
        api::RestError,
        bid::entities,
        kernel::deadline::with_deadline,
    },
};

pub struct GetMyBidsInput {
    pub username: String,
}

impl Service {
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn get_my_bids(&self, input: GetMyBidsInput) -> Result<Vec<entities::Bid>, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let bids = tx.get_bids_by_creator(&input.username).await?;
            tx.commit().await?;
            Ok(bids)
        })
        .await
    }
}
