use {
    super::Service,
    crate::{
        api::RestError,
        identity::resolver::{
            is_responsible_for,
            resolve_user_id,
        },
        kernel::{
            deadline::with_deadline,
            entities::OrganizationId,
        },
        review::entities,
        tender::entities::TenderId,
    },
};

pub struct GetReviewsInput {
    pub tender_id:          TenderId,
    pub author_username:    String,
    pub requester_username: String,
    pub organization_id:    OrganizationId,
}

impl Service {
    /// Lists the reviews on the bids an author placed on a tender for an organization.
    ///
    /// Only responsibles of the organization can read them.
    #[tracing::instrument(
        skip_all,
        fields(tender_id = input.tender_id, organization_id = input.organization_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn get_reviews(
        &self,
        input: GetReviewsInput,
    ) -> Result<Vec<entities::Review>, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let requester = resolve_user_id(tx.as_mut(), &input.requester_username).await?;
            if !is_responsible_for(tx.as_mut(), requester, input.organization_id).await? {
                return Err(RestError::Forbidden(format!(
                    "user {} is not responsible for organization {}",
                    input.requester_username, input.organization_id
                )));
            }

            let reviews = tx
                .get_reviews(
                    input.tender_id,
                    &input.author_username,
                    input.organization_id,
                )
                .await?;
            tx.commit().await?;
            Ok(reviews)
        })
        .await
    }
}
