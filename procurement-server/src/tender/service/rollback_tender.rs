use {
    super::Service,
    crate::{
        api::RestError,
        kernel::{
            deadline::with_deadline,
            entities::Version,
            versioning,
        },
        tender::entities,
    },
};

pub struct RollbackTenderInput {
    pub tender_id: entities::TenderId,
    pub version:   Version,
}

impl Service {
    /// Restores the tender fields stored for `version`. The restored state gets a new version.
    #[tracing::instrument(
        skip_all,
        fields(tender_id = input.tender_id, version = input.version),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn rollback_tender(
        &self,
        input: RollbackTenderInput,
    ) -> Result<entities::Tender, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let tender = versioning::rollback::<entities::Tender, _>(
                tx.as_mut(),
                input.tender_id,
                input.version,
            )
            .await?;
            tx.commit().await?;
            Ok(tender)
        })
        .await
    }
}
