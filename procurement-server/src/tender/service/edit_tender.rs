use {
    super::Service,
    crate::{
        api::RestError,
        kernel::{
            deadline::with_deadline,
            versioning,
        },
        tender::entities,
    },
};

pub struct EditTenderInput {
    pub tender_id: entities::TenderId,
    pub changes:   entities::TenderChanges,
}

impl Service {
    /// Applies the changes and bumps the version. The previous state is kept in the history.
    #[tracing::instrument(skip_all, fields(tender_id = input.tender_id), err(level = tracing::Level::TRACE))]
    pub async fn edit_tender(&self, input: EditTenderInput) -> Result<entities::Tender, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let tender =
                versioning::edit::<entities::Tender, _>(tx.as_mut(), input.tender_id, input.changes)
                    .await?;
            tx.commit().await?;
            Ok(tender)
        })
        .await
    }
}
