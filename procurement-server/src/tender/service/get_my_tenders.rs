use {
    super::Service,
    crate::{
        api::RestError,
        kernel::deadline::with_deadline,
        tender::entities,
    },
};

pub struct GetMyTendersInput {
    pub username: String,
}

impl Service {
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn get_my_tenders(
        &self,
        input: GetMyTendersInput,
    ) -> Result<Vec<entities::Tender>, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let tenders = tx.get_tenders_by_creator(&input.username).await?;
            tx.commit().await?;
            Ok(tenders)
        })
        .await
    }
}
