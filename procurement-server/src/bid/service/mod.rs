use {
    crate::{
        api::RestError,
        bid::entities::BidId,
        identity::{
            entities::BidCreationCheck,
            resolver::has_bid_permission,
        },
        kernel::db::{
            Database,
            Transaction,
        },
    },
    std::{
        sync::Arc,
        time::Duration,
    },
};

pub mod create_bid;
pub mod edit_bid;
pub mod get_bid;
pub mod get_bids_for_tender;
pub mod get_my_bids;
pub mod make_decision;
pub mod rollback_bid;
pub mod set_bid_status;

#[derive(Clone, Debug)]
pub struct Config {
    pub request_timeout:    Duration,
    /// Upper bound of the number of approvals a bid needs.
    pub quorum_cap:         i64,
    pub bid_creation_check: BidCreationCheck,
}

#[derive(Debug)]
pub struct ServiceInner {
    db:     Arc<dyn Database>,
    config: Config,
}

#[derive(Clone, Debug)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(db: Arc<dyn Database>, config: Config) -> Self {
        Self(Arc::new(ServiceInner { db, config }))
    }
}

/// Only the bid author and the responsibles of the bid organization may change a bid.
async fn ensure_bid_permission(
    tx: &mut dyn Transaction,
    bid_id: BidId,
    username: &str,
) -> Result<(), RestError> {
    if tx.get_bid(bid_id).await?.is_none() {
        return Err(RestError::BidNotFound);
    }
    if !has_bid_permission(&mut *tx, bid_id, username).await? {
        return Err(RestError::Forbidden(format!(
            "user {} can not change bid {}",
            username, bid_id
        )));
    }
    Ok(())
}
