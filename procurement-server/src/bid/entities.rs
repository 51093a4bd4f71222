use {
    crate::{
        api::RestError,
        kernel::{
            entities::{
                OrganizationId,
                Username,
                Version,
            },
            versioning::{
                RollbackPolicy,
                Versioned,
            },
        },
        tender::entities::TenderId,
    },
    strum::Display,
    time::OffsetDateTime,
};

pub type BidId = i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
    Submitted,
    Declined,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:               BidId,
    pub name:             String,
    pub description:      String,
    pub status:           BidStatus,
    pub tender_id:        TenderId,
    pub organization_id:  Option<OrganizationId>,
    pub creator_username: Username,
    pub version:          Version,
}

/// A bid that is not stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct BidCreate {
    pub name:             String,
    pub description:      String,
    pub tender_id:        TenderId,
    pub organization_id:  Option<OrganizationId>,
    pub creator_username: Username,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BidChanges {
    pub name:        Option<String>,
    pub description: Option<String>,
}

impl Versioned for Bid {
    type Id = BidId;
    type Changes = BidChanges;

    const ROLLBACK_POLICY: RollbackPolicy = RollbackPolicy::TruncateHistory;

    fn id(&self) -> BidId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply_changes(&mut self, changes: BidChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
    }

    fn not_found() -> RestError {
        RestError::BidNotFound
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DecisionStatus {
    Submitted,
    Declined,
}

/// The latest decision of one user on one bid.
#[derive(Clone, Debug, PartialEq)]
pub struct BidDecision {
    pub bid_id:        BidId,
    pub username:      Username,
    pub decision:      DecisionStatus,
    pub decision_time: OffsetDateTime,
}

/// What a decision did to the bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DecisionOutcome {
    /// The approval was recorded but the quorum is not reached yet.
    Pending,
    /// The quorum was reached. The bid is SUBMITTED and its tender CLOSED.
    Accepted,
    /// The bid is DECLINED.
    Declined,
}
