use {
    super::Service,
    crate::{
        api::RestError,
        bid::entities,
        identity::resolver::{
            passes_bid_creation_check,
            resolve_user_id,
        },
        kernel::deadline::with_deadline,
        tender::entities::TenderStatus,
    },
};

pub struct CreateBidInput {
    pub bid: entities::BidCreate,
}

impl Service {
    /// Stores a new bid in CREATED status on a published tender.
    #[tracing::instrument(
        skip_all,
        fields(tender_id = input.bid.tender_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn create_bid(&self, input: CreateBidInput) -> Result<entities::Bid, RestError> {
        with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let bid = input.bid;

            let user_id = resolve_user_id(tx.as_mut(), &bid.creator_username).await?;
            if let Some(organization_id) = bid.organization_id {
                if !passes_bid_creation_check(
                    tx.as_mut(),
                    user_id,
                    organization_id,
                    self.config.bid_creation_check,
                )
                .await?
                {
                    return Err(RestError::Forbidden(format!(
                        "user {} can not bid on behalf of organization {}",
                        bid.creator_username, organization_id
                    )));
                }
            }

            let tender = tx
                .get_tender(bid.tender_id)
                .await?
                .ok_or(RestError::TenderNotFound)?;
            if tender.status != TenderStatus::Published {
                return Err(RestError::InvalidState(format!(
                    "tender is in {} status, bids can only be placed on PUBLISHED tenders",
                    tender.status
                )));
            }

            let created = tx.add_bid(&bid).await?;
            tx.commit().await?;
            tracing::info!(bid_id = created.id, "Bid created");
            Ok(created)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            bid::service::{
                tests::{
                    bid_create,
                    test_config,
                    test_service,
                },
                Service,
            },
            identity::entities::BidCreationCheck,
            kernel::test_utils::InMemoryDatabase,
        },
        std::sync::Arc,
    };

    #[tokio::test]
    async fn test_create_bid() {
        let db = InMemoryDatabase::new();
        let user2 = db.add_employee("user2").await;
        db.add_responsible(user2, 2).await;
        let tender_id = db
            .add_tender(1, "user1", "Delivery", TenderStatus::Published)
            .await;
        let service = test_service(&db);

        let bid = service
            .create_bid(CreateBidInput {
                bid: bid_create(tender_id, Some(2), "user2"),
            })
            .await
            .unwrap();
        assert_eq!(bid.status, entities::BidStatus::Created);
        assert_eq!(bid.version, 1);
        assert_eq!(bid.tender_id, tender_id);
        assert_eq!(bid.organization_id, Some(2));
    }

    #[tokio::test]
    async fn test_create_bid_requires_published_tender() {
        let db = InMemoryDatabase::new();
        db.add_employee("user2").await;
        let service = test_service(&db);

        for status in [TenderStatus::Created, TenderStatus::Closed] {
            let tender_id = db.add_tender(1, "user1", "Delivery", status).await;
            let result = service
                .create_bid(CreateBidInput {
                    bid: bid_create(tender_id, None, "user2"),
                })
                .await;
            assert!(
                matches!(result, Err(RestError::InvalidState(_))),
                "{:?}",
                result
            );
        }
        assert!(db.state().await.bids.is_empty());

        let result = service
            .create_bid(CreateBidInput {
                bid: bid_create(404, None, "user2"),
            })
            .await;
        assert_eq!(result, Err(RestError::TenderNotFound));
    }

    #[tokio::test]
    async fn test_create_bid_unknown_user() {
        let db = InMemoryDatabase::new();
        let tender_id = db
            .add_tender(1, "user1", "Delivery", TenderStatus::Published)
            .await;
        let service = test_service(&db);

        let result = service
            .create_bid(CreateBidInput {
                bid: bid_create(tender_id, None, "nobody"),
            })
            .await;
        assert_eq!(result, Err(RestError::UserNotFound));
    }

    #[tokio::test]
    async fn test_creation_check_modes() {
        let db = InMemoryDatabase::new();
        let user2 = db.add_employee("user2").await;
        let user3 = db.add_employee("user3").await;
        db.add_responsible(user2, 2).await;
        db.add_responsible(user3, 3).await;
        let tender_id = db
            .add_tender(1, "user1", "Delivery", TenderStatus::Published)
            .await;

        // user2 is responsible for organization 2 only, which is enough for the loose check.
        let loose = test_service(&db);
        loose
            .create_bid(CreateBidInput {
                bid: bid_create(tender_id, Some(3), "user2"),
            })
            .await
            .unwrap();

        let strict = Service::new(
            Arc::new(db.clone()),
            crate::bid::service::Config {
                bid_creation_check: BidCreationCheck::Strict,
                ..test_config()
            },
        );
        let result = strict
            .create_bid(CreateBidInput {
                bid: bid_create(tender_id, Some(3), "user2"),
            })
            .await;
        assert!(matches!(result, Err(RestError::Forbidden(_))));
        strict
            .create_bid(CreateBidInput {
                bid: bid_create(tender_id, Some(2), "user2"),
            })
            .await
            .unwrap();
    }
}
