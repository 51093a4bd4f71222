use {
    super::Service,
    crate::{
        api::RestError,
        bid::entities::{
            self,
            BidStatus,
            DecisionOutcome,
            DecisionStatus,
        },
        identity::resolver::has_bid_permission,
        kernel::{
            db::Transaction,
            deadline::with_deadline,
        },
        metrics::DECISIONS_TOTAL,
        tender::entities::TenderStatus,
    },
    axum_prometheus::metrics,
};

pub struct MakeDecisionInput {
    pub bid_id:   entities::BidId,
    pub username: String,
    pub decision: DecisionStatus,
}

impl Service {
    /// Records an approval of the bid by a responsible user.
    ///
    /// Once the number of approvals reaches the quorum, the bid becomes SUBMITTED and its tender
    /// CLOSED. The quorum is the number of responsibles of the bid organization, capped by the
    /// configured quorum cap.
    pub async fn submit_decision(
        &self,
        bid_id: entities::BidId,
        username: String,
    ) -> Result<entities::Bid, RestError> {
        self.make_decision(MakeDecisionInput {
            bid_id,
            username,
            decision: DecisionStatus::Submitted,
        })
        .await
    }

    /// Declines the bid. A declined bid stays declined whatever decisions follow.
    pub async fn decline_decision(
        &self,
        bid_id: entities::BidId,
        username: String,
    ) -> Result<entities::Bid, RestError> {
        self.make_decision(MakeDecisionInput {
            bid_id,
            username,
            decision: DecisionStatus::Declined,
        })
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(bid_id = input.bid_id, decision = %input.decision, outcome),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn make_decision(&self, input: MakeDecisionInput) -> Result<entities::Bid, RestError> {
        let decision = input.decision;
        let result = with_deadline(self.config.request_timeout, async {
            let mut tx = self.db.begin().await?;
            let result = self.decide(tx.as_mut(), &input).await?;
            tx.commit().await?;
            Ok(result)
        })
        .await;

        let outcome = match &result {
            Ok((_, outcome)) => outcome.to_string(),
            Err(_) => "rejected".to_string(),
        };
        tracing::Span::current().record("outcome", outcome.as_str());
        metrics::counter!(
            DECISIONS_TOTAL,
            &[("decision", decision.to_string()), ("outcome", outcome)]
        )
        .increment(1);

        result.map(|(bid, _)| bid)
    }

    async fn decide(
        &self,
        tx: &mut dyn Transaction,
        input: &MakeDecisionInput,
    ) -> Result<(entities::Bid, DecisionOutcome), RestError> {
        if !has_bid_permission(&mut *tx, input.bid_id, &input.username).await? {
            return Err(RestError::Forbidden(format!(
                "user {} can not decide on bid {}",
                input.username, input.bid_id
            )));
        }

        // Serializes concurrent decisions on the bid until the transaction ends.
        let bid = tx
            .get_bid_for_update(input.bid_id)
            .await?
            .ok_or(RestError::BidNotFound)?;
        if bid.status != BidStatus::Published {
            return Err(RestError::InvalidState(
                "bid must be in PUBLISHED status to submit decision".to_string(),
            ));
        }

        match input.decision {
            DecisionStatus::Declined => {
                tx.upsert_decision(bid.id, &input.username, DecisionStatus::Declined)
                    .await?;
                let bid = self.set_status(tx, bid.id, BidStatus::Declined).await?;
                Ok((bid, DecisionOutcome::Declined))
            }
            DecisionStatus::Submitted => {
                if tx.count_decisions(bid.id, DecisionStatus::Declined).await? > 0 {
                    let bid = self.set_status(tx, bid.id, BidStatus::Declined).await?;
                    return Ok((bid, DecisionOutcome::Declined));
                }

                tx.upsert_decision(bid.id, &input.username, DecisionStatus::Submitted)
                    .await?;
                let responsibles = match bid.organization_id {
                    Some(organization_id) => {
                        tx.count_organization_responsibles(organization_id).await?
                    }
                    None => 0,
                };
                let quorum = self.config.quorum_cap.min(responsibles);
                let submitted = tx.count_decisions(bid.id, DecisionStatus::Submitted).await?;
                tracing::debug!(submitted, quorum, "Counted approvals");
                if submitted < quorum {
                    return Ok((bid, DecisionOutcome::Pending));
                }

                let bid = self.set_status(tx, bid.id, BidStatus::Submitted).await?;
                tx.update_tender_status(bid.tender_id, TenderStatus::Closed)
                    .await?
                    .ok_or(RestError::TenderNotFound)?;
                tracing::info!(tender_id = bid.tender_id, "Bid accepted, tender closed");
                Ok((bid, DecisionOutcome::Accepted))
            }
        }
    }

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        bid_id: entities::BidId,
        status: BidStatus,
    ) -> Result<entities::Bid, RestError> {
        tx.update_bid_status(bid_id, status)
            .await?
            .ok_or(RestError::BidNotFound)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            bid::service::{
                create_bid::CreateBidInput,
                set_bid_status::SetBidStatusInput,
                tests::{
                    bid_create,
                    test_service,
                },
            },
            kernel::test_utils::InMemoryDatabase,
            tender::service::{
                create_tender::CreateTenderInput,
                set_tender_status::SetTenderStatusInput,
                tests::{
                    tender_create,
                    test_service as test_tender_service,
                },
            },
        },
    };

    /// A published tender of organization 1 with a published bid of organization 2, which has
    /// `responsibles` responsible users named `r0`, `r1`, ...
    async fn setup(responsibles: usize) -> (InMemoryDatabase, i32, i32) {
        let db = InMemoryDatabase::new();
        for i in 0..responsibles {
            let user_id = db.add_employee(&format!("r{}", i)).await;
            db.add_responsible(user_id, 2).await;
        }
        let tender_id = db
            .add_tender(1, "user1", "Delivery", TenderStatus::Published)
            .await;
        let bid_id = db
            .add_bid(tender_id, Some(2), "r0", BidStatus::Published)
            .await;
        (db, tender_id, bid_id)
    }

    #[tokio::test]
    async fn test_quorum_is_capped_by_responsibles() {
        for (responsibles, quorum) in [(1, 1), (2, 2), (3, 3), (5, 3)] {
            let (db, tender_id, bid_id) = setup(responsibles).await;
            let service = test_service(&db);

            for i in 0..quorum {
                let bid = service
                    .submit_decision(bid_id, format!("r{}", i))
                    .await
                    .unwrap();
                let state = db.state().await;
                if i + 1 < quorum {
                    assert_eq!(bid.status, BidStatus::Published);
                    assert_eq!(state.tenders[&tender_id].status, TenderStatus::Published);
                } else {
                    assert_eq!(bid.status, BidStatus::Submitted, "R = {}", responsibles);
                    assert_eq!(state.tenders[&tender_id].status, TenderStatus::Closed);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_repeated_submit_does_not_advance_quorum() {
        let (db, _, bid_id) = setup(2).await;
        let service = test_service(&db);

        for _ in 0..3 {
            let bid = service
                .submit_decision(bid_id, "r0".to_string())
                .await
                .unwrap();
            assert_eq!(bid.status, BidStatus::Published);
        }
        assert_eq!(db.state().await.decisions.len(), 1);
    }

    #[tokio::test]
    async fn test_decline_is_final() {
        let (db, tender_id, bid_id) = setup(3).await;
        let service = test_service(&db);

        let bid = service
            .decline_decision(bid_id, "r1".to_string())
            .await
            .unwrap();
        assert_eq!(bid.status, BidStatus::Declined);
        assert_eq!(
            db.state().await.tenders[&tender_id].status,
            TenderStatus::Published
        );

        let result = service.submit_decision(bid_id, "r0".to_string()).await;
        assert!(matches!(result, Err(RestError::InvalidState(_))));

        // Publishing the bid again does not clear the earlier decline.
        service
            .set_bid_status(SetBidStatusInput {
                bid_id,
                status: BidStatus::Published,
            })
            .await
            .unwrap();
        let bid = service
            .submit_decision(bid_id, "r0".to_string())
            .await
            .unwrap();
        assert_eq!(bid.status, BidStatus::Declined);
        let result = service.submit_decision(bid_id, "r2".to_string()).await;
        assert!(matches!(result, Err(RestError::InvalidState(_))));

        let state = db.state().await;
        assert_eq!(state.bids[&bid_id].status, BidStatus::Declined);
        assert_eq!(state.tenders[&tender_id].status, TenderStatus::Published);
        assert!(!state
            .decisions
            .iter()
            .any(|d| d.decision == DecisionStatus::Submitted));
    }

    #[tokio::test]
    async fn test_decline_on_republished_bid() {
        let (db, tender_id, bid_id) = setup(3).await;
        let service = test_service(&db);

        service
            .submit_decision(bid_id, "r0".to_string())
            .await
            .unwrap();
        service
            .decline_decision(bid_id, "r1".to_string())
            .await
            .unwrap();
        service
            .set_bid_status(SetBidStatusInput {
                bid_id,
                status: BidStatus::Published,
            })
            .await
            .unwrap();

        let bid = service
            .decline_decision(bid_id, "r2".to_string())
            .await
            .unwrap();
        assert_eq!(bid.status, BidStatus::Declined);

        let state = db.state().await;
        let declined: Vec<_> = state
            .decisions
            .iter()
            .filter(|d| d.decision == DecisionStatus::Declined)
            .map(|d| d.username.as_str())
            .collect();
        assert_eq!(declined, vec!["r1", "r2"]);
        assert_eq!(state.bids[&bid_id].status, BidStatus::Declined);
        assert_eq!(state.tenders[&tender_id].status, TenderStatus::Published);
    }

    #[tokio::test]
    async fn test_decision_requires_permission() {
        let (db, _, bid_id) = setup(1).await;
        db.add_employee("outsider").await;
        let service = test_service(&db);

        let result = service
            .submit_decision(bid_id, "outsider".to_string())
            .await;
        assert!(matches!(result, Err(RestError::Forbidden(_))));

        let result = service.submit_decision(bid_id, "nobody".to_string()).await;
        assert_eq!(result, Err(RestError::UserNotFound));
        assert!(db.state().await.decisions.is_empty());
    }

    #[tokio::test]
    async fn test_decision_requires_published_bid() {
        let db = InMemoryDatabase::new();
        let user_id = db.add_employee("r0").await;
        db.add_responsible(user_id, 2).await;
        let bid_id = db.add_bid(1, Some(2), "r0", BidStatus::Created).await;
        let service = test_service(&db);

        let result = service.submit_decision(bid_id, "r0".to_string()).await;
        assert_eq!(
            result,
            Err(RestError::InvalidState(
                "bid must be in PUBLISHED status to submit decision".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_failed_cascade_rolls_back_decision() {
        let (db, tender_id, bid_id) = setup(1).await;
        db.fail_on("update_tender_status").await;
        let service = test_service(&db);

        let result = service.submit_decision(bid_id, "r0".to_string()).await;
        assert_eq!(result, Err(RestError::TemporarilyUnavailable));

        let state = db.state().await;
        assert!(state.decisions.is_empty());
        assert_eq!(state.bids[&bid_id].status, BidStatus::Published);
        assert_eq!(state.tenders[&tender_id].status, TenderStatus::Published);
    }

    #[tokio::test]
    async fn test_tender_to_accepted_bid() {
        let db = InMemoryDatabase::new();
        let user1 = db.add_employee("user1").await;
        db.add_responsible(user1, 1).await;
        for name in ["user2", "user3", "user4"] {
            let user_id = db.add_employee(name).await;
            db.add_responsible(user_id, 2).await;
        }
        let tender_service = test_tender_service(&db);
        let bid_service = test_service(&db);

        let tender = tender_service
            .create_tender(CreateTenderInput {
                tender: tender_create(1, "user1"),
            })
            .await
            .unwrap();
        tender_service
            .set_tender_status(SetTenderStatusInput {
                tender_id: tender.id,
                status:    TenderStatus::Published,
            })
            .await
            .unwrap();

        let bid = bid_service
            .create_bid(CreateBidInput {
                bid: bid_create(tender.id, Some(2), "user2"),
            })
            .await
            .unwrap();
        assert_eq!(bid.status, BidStatus::Created);
        assert_eq!(bid.version, 1);
        bid_service
            .set_bid_status(SetBidStatusInput {
                bid_id: bid.id,
                status: BidStatus::Published,
            })
            .await
            .unwrap();

        let mut last = None;
        for name in ["user2", "user3", "user4"] {
            last = Some(
                bid_service
                    .submit_decision(bid.id, name.to_string())
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(last.map(|b| b.status), Some(BidStatus::Submitted));
        assert_eq!(
            db.state().await.tenders[&tender.id].status,
            TenderStatus::Closed
        );
    }
}
