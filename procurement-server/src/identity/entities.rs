use serde::Deserialize;

pub use crate::kernel::entities::{
    OrganizationId,
    UserId,
};

/// How strictly the bid author's link to the bid organization is checked on bid creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidCreationCheck {
    /// The author is responsible for any organization, or the organization has any responsible.
    #[default]
    Loose,
    /// The author is responsible for the bid organization.
    Strict,
}
