use {
    super::Service,
    crate::{
        api::RestError,
        bid::entities,
        kernel::deadline::with_deadline,
        tender::entities::TenderId,
    },
};

pub struct GetBidsForTenderInput {
    pub tender_id: TenderId,
}

impl Service {
    #[tracing::instrument(skip_all, fields(tender_id = input.tender_id), err(level = tracing::Level::TRACE))]
    pub async fn get_bids_for_tender(
        &self,
        input: GetBidsForTenderInput,
    ) -> Result<Vec<entities::Bid>, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let bids = tx.get_bids_by_tender(input.tender_id).await?;
            tx.commit().await?;
            Ok(bids)
        })
        .await
    }
}
