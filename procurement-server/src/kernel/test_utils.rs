//! An in-memory stand-in for the Postgres store, used by the service tests.
//!
//! A transaction holds the store lock from `begin` until it is committed or dropped and works on a
//! copy of the state, so dropping it discards every write.

use {
    crate::{
        api::RestError,
        bid::{
            entities::{
                Bid,
                BidCreate,
                BidDecision,
                BidId,
                BidStatus,
                DecisionStatus,
            },
            repository::{
                BidTable,
                DecisionTable,
            },
        },
        identity::repository::IdentityTable,
        kernel::{
            db::{
                Database,
                Transaction,
            },
            entities::{
                OrganizationId,
                UserId,
                Username,
                Version,
            },
            versioning::VersionedTable,
        },
        review::{
            entities::{
                Review,
                ReviewCreate,
            },
            repository::ReviewTable,
        },
        tender::{
            entities::{
                Tender,
                TenderCreate,
                TenderId,
                TenderStatus,
            },
            repository::TenderTable,
        },
    },
    axum::async_trait,
    std::{
        collections::{
            BTreeMap,
            HashSet,
        },
        sync::Arc,
    },
    time::OffsetDateTime,
    tokio::sync::{
        Mutex,
        OwnedMutexGuard,
    },
};

#[derive(Clone, Debug, Default)]
pub struct State {
    pub employees:      BTreeMap<UserId, Username>,
    pub responsibles:   Vec<(UserId, OrganizationId)>,
    pub tenders:        BTreeMap<TenderId, Tender>,
    pub tender_history: BTreeMap<(TenderId, Version), Tender>,
    pub bids:           BTreeMap<BidId, Bid>,
    pub bid_history:    BTreeMap<(BidId, Version), Bid>,
    pub decisions:      Vec<BidDecision>,
    pub reviews:        Vec<Review>,
    last_id:            i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn responsibles_of(&self, bid: &Bid) -> Vec<UserId> {
        self.responsibles
            .iter()
            .filter(|(_, organization_id)| Some(*organization_id) == bid.organization_id)
            .map(|(user_id, _)| *user_id)
            .collect()
    }

    /// Rows of the bids joined with the responsibles of their organization that name the user.
    fn count_permissions<'a>(
        &self,
        bids: impl Iterator<Item = &'a Bid>,
        username: &str,
        user_id: UserId,
    ) -> i64 {
        bids.map(|bid| {
            self.responsibles_of(bid)
                .into_iter()
                .filter(|responsible| bid.creator_username == username || *responsible == user_id)
                .count() as i64
        })
        .sum()
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryDatabase {
    state:      Arc<Mutex<State>>,
    failpoints: Arc<Mutex<HashSet<&'static str>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> State {
        self.state.lock().await.clone()
    }

    /// Makes every later call of the named table operation fail like a lost connection.
    pub async fn fail_on(&self, operation: &'static str) {
        self.failpoints.lock().await.insert(operation);
    }

    pub async fn add_employee(&self, username: &str) -> UserId {
        let mut state = self.state.lock().await;
        let user_id = state.next_id();
        state.employees.insert(user_id, username.to_string());
        user_id
    }

    pub async fn add_responsible(&self, user_id: UserId, organization_id: OrganizationId) {
        self.state
            .lock()
            .await
            .responsibles
            .push((user_id, organization_id));
    }

    pub async fn add_tender(
        &self,
        organization_id: OrganizationId,
        creator_username: &str,
        service_type: &str,
        status: TenderStatus,
    ) -> TenderId {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.tenders.insert(id, Tender {
            id,
            name: format!("Tender {}", id),
            description: format!("Description of tender {}", id),
            service_type: service_type.to_string(),
            status,
            organization_id,
            creator_username: creator_username.to_string(),
            version: 1,
        });
        id
    }

    pub async fn add_bid(
        &self,
        tender_id: TenderId,
        organization_id: Option<OrganizationId>,
        creator_username: &str,
        status: BidStatus,
    ) -> BidId {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.bids.insert(id, Bid {
            id,
            name: format!("Bid {}", id),
            description: format!("Description of bid {}", id),
            status,
            tender_id,
            organization_id,
            creator_username: creator_username.to_string(),
            version: 1,
        });
        id
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RestError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        let failpoints = self.failpoints.lock().await.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            working,
            failpoints,
        }))
    }
}

pub struct InMemoryTransaction {
    guard:      OwnedMutexGuard<State>,
    working:    State,
    failpoints: HashSet<&'static str>,
}

impl InMemoryTransaction {
    fn check(&self, operation: &'static str) -> Result<(), RestError> {
        if self.failpoints.contains(operation) {
            return Err(RestError::TemporarilyUnavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), RestError> {
        let InMemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl TenderTable for InMemoryTransaction {
    async fn add_tender(&mut self, tender: &TenderCreate) -> Result<Tender, RestError> {
        self.check("add_tender")?;
        let id = self.working.next_id();
        let created = Tender {
            id,
            name: tender.name.clone(),
            description: tender.description.clone(),
            service_type: tender.service_type.clone(),
            status: TenderStatus::Created,
            organization_id: tender.organization_id,
            creator_username: tender.creator_username.clone(),
            version: 1,
        };
        self.working.tenders.insert(id, created.clone());
        Ok(created)
    }

    async fn get_tender(&mut self, id: TenderId) -> Result<Option<Tender>, RestError> {
        self.check("get_tender")?;
        Ok(self.working.tenders.get(&id).cloned())
    }

    async fn get_published_tenders(
        &mut self,
        service_type: Option<String>,
    ) -> Result<Vec<Tender>, RestError> {
        self.check("get_published_tenders")?;
        Ok(self
            .working
            .tenders
            .values()
            .filter(|t| t.status == TenderStatus::Published)
            .filter(|t| service_type.as_ref().map_or(true, |s| &t.service_type == s))
            .cloned()
            .collect())
    }

    async fn get_tenders_by_creator(&mut self, username: &str) -> Result<Vec<Tender>, RestError> {
        self.check("get_tenders_by_creator")?;
        Ok(self
            .working
            .tenders
            .values()
            .filter(|t| t.creator_username == username)
            .cloned()
            .collect())
    }

    async fn update_tender_status(
        &mut self,
        id: TenderId,
        status: TenderStatus,
    ) -> Result<Option<Tender>, RestError> {
        self.check("update_tender_status")?;
        Ok(self.working.tenders.get_mut(&id).map(|tender| {
            tender.status = status;
            tender.clone()
        }))
    }
}

#[async_trait]
impl VersionedTable<Tender> for InMemoryTransaction {
    async fn get_live(&mut self, id: TenderId) -> Result<Option<Tender>, RestError> {
        self.check("get_tender")?;
        Ok(self.working.tenders.get(&id).cloned())
    }

    async fn add_history(&mut self, snapshot: &Tender) -> Result<(), RestError> {
        self.check("add_tender_history")?;
        self.working
            .tender_history
            .insert((snapshot.id, snapshot.version), snapshot.clone());
        Ok(())
    }

    async fn get_history(
        &mut self,
        id: TenderId,
        version: Version,
    ) -> Result<Option<Tender>, RestError> {
        self.check("get_tender_history")?;
        Ok(self.working.tender_history.get(&(id, version)).cloned())
    }

    async fn update_if_version(
        &mut self,
        tender: &Tender,
        expected_version: Version,
    ) -> Result<bool, RestError> {
        self.check("update_tender")?;
        match self.working.tenders.get_mut(&tender.id) {
            Some(live) if live.version == expected_version => {
                *live = tender.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_history_after(
        &mut self,
        id: TenderId,
        version: Version,
    ) -> Result<u64, RestError> {
        self.check("remove_tender_history")?;
        let before = self.working.tender_history.len();
        self.working
            .tender_history
            .retain(|(tender_id, v), _| *tender_id != id || *v <= version);
        Ok((before - self.working.tender_history.len()) as u64)
    }
}

#[async_trait]
impl BidTable for InMemoryTransaction {
    async fn add_bid(&mut self, bid: &BidCreate) -> Result<Bid, RestError> {
        self.check("add_bid")?;
        let id = self.working.next_id();
        let created = Bid {
            id,
            name: bid.name.clone(),
            description: bid.description.clone(),
            status: BidStatus::Created,
            tender_id: bid.tender_id,
            organization_id: bid.organization_id,
            creator_username: bid.creator_username.clone(),
            version: 1,
        };
        self.working.bids.insert(id, created.clone());
        Ok(created)
    }

    async fn get_bid(&mut self, id: BidId) -> Result<Option<Bid>, RestError> {
        self.check("get_bid")?;
        Ok(self.working.bids.get(&id).cloned())
    }

    async fn get_bid_for_update(&mut self, id: BidId) -> Result<Option<Bid>, RestError> {
        self.check("get_bid_for_update")?;
        Ok(self.working.bids.get(&id).cloned())
    }

    async fn get_bids_by_tender(&mut self, tender_id: TenderId) -> Result<Vec<Bid>, RestError> {
        self.check("get_bids_by_tender")?;
        Ok(self
            .working
            .bids
            .values()
            .filter(|b| b.tender_id == tender_id)
            .cloned()
            .collect())
    }

    async fn get_bids_by_creator(&mut self, username: &str) -> Result<Vec<Bid>, RestError> {
        self.check("get_bids_by_creator")?;
        Ok(self
            .working
            .bids
            .values()
            .filter(|b| b.creator_username == username)
            .cloned()
            .collect())
    }

    async fn update_bid_status(
        &mut self,
        id: BidId,
        status: BidStatus,
    ) -> Result<Option<Bid>, RestError> {
        self.check("update_bid_status")?;
        Ok(self.working.bids.get_mut(&id).map(|bid| {
            bid.status = status;
            bid.clone()
        }))
    }
}

#[async_trait]
impl VersionedTable<Bid> for InMemoryTransaction {
    async fn get_live(&mut self, id: BidId) -> Result<Option<Bid>, RestError> {
        self.check("get_bid")?;
        Ok(self.working.bids.get(&id).cloned())
    }

    async fn add_history(&mut self, snapshot: &Bid) -> Result<(), RestError> {
        self.check("add_bid_history")?;
        self.working
            .bid_history
            .insert((snapshot.id, snapshot.version), snapshot.clone());
        Ok(())
    }

    async fn get_history(&mut self, id: BidId, version: Version) -> Result<Option<Bid>, RestError> {
        self.check("get_bid_history")?;
        Ok(self.working.bid_history.get(&(id, version)).cloned())
    }

    async fn update_if_version(
        &mut self,
        bid: &Bid,
        expected_version: Version,
    ) -> Result<bool, RestError> {
        self.check("update_bid")?;
        match self.working.bids.get_mut(&bid.id) {
            Some(live) if live.version == expected_version => {
                *live = bid.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_history_after(&mut self, id: BidId, version: Version) -> Result<u64, RestError> {
        self.check("remove_bid_history")?;
        let before = self.working.bid_history.len();
        self.working
            .bid_history
            .retain(|(bid_id, v), _| *bid_id != id || *v <= version);
        Ok((before - self.working.bid_history.len()) as u64)
    }
}

#[async_trait]
impl DecisionTable for InMemoryTransaction {
    async fn upsert_decision(
        &mut self,
        bid_id: BidId,
        username: &str,
        decision: DecisionStatus,
    ) -> Result<BidDecision, RestError> {
        self.check("upsert_decision")?;
        let recorded = BidDecision {
            bid_id,
            username: username.to_string(),
            decision,
            decision_time: OffsetDateTime::now_utc(),
        };
        let decisions = &mut self.working.decisions;
        match decisions
            .iter_mut()
            .find(|d| d.bid_id == bid_id && d.username == username)
        {
            Some(existing) => *existing = recorded.clone(),
            None => decisions.push(recorded.clone()),
        }
        Ok(recorded)
    }

    async fn count_decisions(
        &mut self,
        bid_id: BidId,
        decision: DecisionStatus,
    ) -> Result<i64, RestError> {
        self.check("count_decisions")?;
        Ok(self
            .working
            .decisions
            .iter()
            .filter(|d| d.bid_id == bid_id && d.decision == decision)
            .count() as i64)
    }
}

#[async_trait]
impl IdentityTable for InMemoryTransaction {
    async fn get_user_id(&mut self, username: &str) -> Result<Option<UserId>, RestError> {
        self.check("get_user_id")?;
        Ok(self
            .working
            .employees
            .iter()
            .find(|(_, name)| name.as_str() == username)
            .map(|(user_id, _)| *user_id))
    }

    async fn count_responsibilities(
        &mut self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError> {
        self.check("count_responsibilities")?;
        Ok(self
            .working
            .responsibles
            .iter()
            .filter(|(u, o)| *u == user_id && *o == organization_id)
            .count() as i64)
    }

    async fn count_loose_responsibilities(
        &mut self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError> {
        self.check("count_loose_responsibilities")?;
        Ok(self
            .working
            .responsibles
            .iter()
            .filter(|(u, o)| *u == user_id || *o == organization_id)
            .count() as i64)
    }

    async fn count_organization_responsibles(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError> {
        self.check("count_organization_responsibles")?;
        Ok(self
            .working
            .responsibles
            .iter()
            .filter(|(_, o)| *o == organization_id)
            .count() as i64)
    }

    async fn count_bid_permissions(
        &mut self,
        bid_id: BidId,
        username: &str,
        user_id: UserId,
    ) -> Result<i64, RestError> {
        self.check("count_bid_permissions")?;
        let state = &self.working;
        Ok(state.count_permissions(state.bids.get(&bid_id).into_iter(), username, user_id))
    }

    async fn count_tender_permissions(
        &mut self,
        tender_id: TenderId,
        username: &str,
        user_id: UserId,
    ) -> Result<i64, RestError> {
        self.check("count_tender_permissions")?;
        let state = &self.working;
        Ok(state.count_permissions(
            state.bids.values().filter(|b| b.tender_id == tender_id),
            username,
            user_id,
        ))
    }
}

#[async_trait]
impl ReviewTable for InMemoryTransaction {
    async fn add_review(&mut self, review: &ReviewCreate) -> Result<Review, RestError> {
        self.check("add_review")?;
        let created = Review {
            id:              self.working.next_id(),
            bid_id:          review.bid_id,
            username:        review.username.clone(),
            organization_id: review.organization_id,
            comment:         review.comment.clone(),
        };
        self.working.reviews.push(created.clone());
        Ok(created)
    }

    async fn get_reviews(
        &mut self,
        tender_id: TenderId,
        author_username: &str,
        organization_id: OrganizationId,
    ) -> Result<Vec<Review>, RestError> {
        self.check("get_reviews")?;
        let bids = &self.working.bids;
        Ok(self
            .working
            .reviews
            .iter()
            .filter(|review| {
                bids.get(&review.bid_id).map_or(false, |bid| {
                    bid.tender_id == tender_id
                        && bid.creator_username == author_username
                        && bid.organization_id == Some(organization_id)
                })
            })
            .cloned()
            .collect())
    }
}
