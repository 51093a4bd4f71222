use crate::{
    bid::entities::BidId,
    kernel::entities::{
        OrganizationId,
        Username,
    },
};

pub type ReviewId = i32;

/// Feedback left on a bid. Reviews are never edited or deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct Review {
    pub id:              ReviewId,
    pub bid_id:          BidId,
    pub username:        Username,
    pub organization_id: OrganizationId,
    pub comment:         String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewCreate {
    pub bid_id:          BidId,
    pub username:        Username,
    pub organization_id: OrganizationId,
    pub comment:         String,
}
