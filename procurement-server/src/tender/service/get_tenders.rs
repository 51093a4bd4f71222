use {
    super::Service,
    crate::{
        api::RestError,
        kernel::deadline::with_deadline,
        tender::entities,
    },
};

pub struct GetTendersInput {
    pub service_type: Option<String>,
}

impl Service {
    /// Published tenders, optionally of one service type, ordered by id.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn get_tenders(
        &self,
        input: GetTendersInput,
    ) -> Result<Vec<entities::Tender>, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let tenders = tx.get_published_tenders(input.service_type).await?;
            tx.commit().await?;
            Ok(tenders)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            kernel::test_utils::InMemoryDatabase,
            tender::service::tests::test_service,
        },
    };

    #[tokio::test]
    async fn test_get_tenders_returns_published_only() {
        let db = InMemoryDatabase::new();
        let draft = db
            .add_tender(1, "user1", "Delivery", entities::TenderStatus::Created)
            .await;
        let delivery = db
            .add_tender(1, "user1", "Delivery", entities::TenderStatus::Published)
            .await;
        let construction = db
            .add_tender(2, "user2", "Construction", entities::TenderStatus::Published)
            .await;
        db.add_tender(2, "user2", "Construction", entities::TenderStatus::Closed)
            .await;
        let service = test_service(&db);

        let tenders = service
            .get_tenders(GetTendersInput { service_type: None })
            .await
            .unwrap();
        assert_eq!(
            tenders.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![delivery, construction]
        );
        assert!(!tenders.iter().any(|t| t.id == draft));

        let tenders = service
            .get_tenders(GetTendersInput {
                service_type: Some("Construction".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(
            tenders.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![construction]
        );
    }
}
