use {
    super::Service,
    crate::{
        api::RestError,
        kernel::deadline::with_deadline,
        tender::entities,
    },
};

pub struct GetTenderInput {
    pub tender_id: entities::TenderId,
}

impl Service {
    #[tracing::instrument(skip_all, fields(tender_id = input.tender_id), err(level = tracing::Level::TRACE))]
    pub async fn get_tender(&self, input: GetTenderInput) -> Result<entities::Tender, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let tender = tx
                .get_tender(input.tender_id)
                .await?
                .ok_or(RestError::TenderNotFound)?;
            tx.commit().await?;
            Ok(tender)
        })
        .await
    }
}
