use {
    super::Service,
    crate::{
        api::RestError,
        kernel::deadline::with_deadline,
        tender::entities,
    },
};

pub struct SetTenderStatusInput {
    pub tender_id: entities::TenderId,
    pub status:    entities::TenderStatus,
}

impl Service {
    /// Sets the status of a tender. Only PUBLISHED and CLOSED can be set directly.
    #[tracing::instrument(
        skip_all,
        fields(tender_id = input.tender_id, status = %input.status),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn set_tender_status(
        &self,
        input: SetTenderStatusInput,
    ) -> Result<entities::Tender, RestError> {
        match input.status {
            entities::TenderStatus::Published | entities::TenderStatus::Closed => {}
            status => {
                return Err(RestError::BadParameters(format!(
                    "tender status can not be set to {}",
                    status
                )))
            }
        }

        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let tender = tx
                .update_tender_status(input.tender_id, input.status)
                .await?
                .ok_or(RestError::TenderNotFound)?;
            tx.commit().await?;
            Ok(tender)
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
    async fn test_set_tender_status_is_idempotent() {
        let db = InMemoryDatabase::new();
        let tender_id = db
            .add_tender(1, "user1", "Delivery", entities::TenderStatus::Created)
            .await;
        let service = test_service(&db);

        for _ in 0..2 {
            let tender = service
                .set_tender_status(SetTenderStatusInput {
                    tender_id,
                    status: entities::TenderStatus::Published,
                })
                .await
                .unwrap();
            assert_eq!(tender.status, entities::TenderStatus::Published);
            assert_eq!(tender.version, 1);
        }

        let tender = service
            .set_tender_status(SetTenderStatusInput {
                tender_id,
                status: entities::TenderStatus::Closed,
            })
            .await
            .unwrap();
        assert_eq!(tender.status, entities::TenderStatus::Closed);
    }

    #[tokio::test]
    async fn test_set_tender_status_rejects_created() {
        let db = InMemoryDatabase::new();
        let tender_id = db
            .add_tender(1, "user1", "Delivery", entities::TenderStatus::Published)
            .await;
        let service = test_service(&db);

        let result = service
            .set_tender_status(SetTenderStatusInput {
                tender_id,
                status: entities::TenderStatus::Created,
            })
            .await;
        assert!(matches!(result, Err(RestError::BadParameters(_))));
    }

    #[tokio::test]
    async fn test_set_tender_status_missing_tender() {
        let db = InMemoryDatabase::new();
        let service = test_service(&db);

        let result = service
            .set_tender_status(SetTenderStatusInput {
                tender_id: 42,
                status:    entities::TenderStatus::Published,
            })
            .await;
        assert_eq!(result, Err(RestError::TenderNotFound));
    }
}
