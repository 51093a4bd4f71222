use {
    super::Service,
    crate::{
        api::RestError,
        identity::resolver::is_responsible_for,
        kernel::deadline::with_deadline,
        tender::entities,
    },
};

pub struct CreateTenderInput {
    pub tender: entities::TenderCreate,
}

impl Service {
    /// Stores a new tender in CREATED status. The creator must be responsible for the organization.
    #[tracing::instrument(
        skip_all,
        fields(organization_id = input.tender.organization_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn create_tender(
        &self,
        input: CreateTenderInput,
    ) -> Result<entities::Tender, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let tender = input.tender;
            let forbidden = || {
                RestError::Forbidden(format!(
                    "user {} is not responsible for organization {}",
                    tender.creator_username, tender.organization_id
                ))
            };

            // An unknown creator is treated like a creator without responsibility.
            let user_id = tx
                .get_user_id(&tender.creator_username)
                .await?
                .ok_or_else(forbidden)?;
            if !is_responsible_for(tx.as_mut(), user_id, tender.organization_id).await? {
                return Err(forbidden());
            }

            let created = tx.add_tender(&tender).await?;
            tx.commit().await?;
            tracing::info!(tender_id = created.id, "Tender created");
            Ok(created)
        })
        .await
    }
}
