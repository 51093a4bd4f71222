use {
    crate::{
        tender::TenderId,
        OrganizationId,
        Routable,
        Route as ApiRoute,
        RouteProperties,
        Username,
        Version,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub type BidId = i32;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "UPPERCASE")]
pub enum BidStatus {
    /// The bid is a draft.
    Created,
    /// The bid is visible to the tender owner and open for decisions.
    Published,
    /// The bid was withdrawn by its author.
    Canceled,
    /// The bid reached the approval quorum. Its tender is closed.
    Submitted,
    /// The bid was declined by a responsible user. This is final.
    Declined,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "UPPERCASE")]
pub enum BidDecisionStatus {
    Submitted,
    Declined,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    #[schema(example = 1)]
    pub id:               BidId,
    #[schema(example = "Cleaning by CleanCo")]
    pub name:             String,
    #[schema(example = "Five people, every morning")]
    pub description:      String,
    pub status:           BidStatus,
    #[schema(example = 1)]
    pub tender_id:        TenderId,
    #[schema(example = 2)]
    pub organization_id:  Option<OrganizationId>,
    #[schema(example = "user2")]
    pub creator_username: Username,
    #[schema(example = 1)]
    pub version:          Version,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BidCreate {
    #[schema(example = "Cleaning by CleanCo")]
    pub name:             String,
    #[schema(example = "Five people, every morning")]
    pub description:      String,
    /// The tender to bid on. It must be published.
    #[schema(example = 1)]
    pub tender_id:        TenderId,
    #[schema(example = 2)]
    pub organization_id:  Option<OrganizationId>,
    #[schema(example = "user2")]
    pub creator_username: Username,
}

/// Fields left out of the body keep their current value.
#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BidEdit {
    pub name:        Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
pub struct BidStatusUpdate {
    /// Only PUBLISHED and CANCELED can be set directly.
    pub status: BidStatus,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
pub struct BidDecisionCreate {
    /// The user casting the decision. It must be the bid author or responsible for the bid organization.
    #[schema(example = "user3")]
    pub username: Username,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BidDecisionResult {
    #[schema(example = "Decision recorded")]
    pub message: String,
    /// The bid after the decision was applied.
    pub bid:     Bid,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = ":id/list")]
    GetBidsForTender,
    #[strum(serialize = "my")]
    GetMyBids,
    #[strum(serialize = "new")]
    PostBid,
    #[strum(serialize = ":id")]
    GetBid,
    #[strum(serialize = "status/:id")]
    PatchBidStatus,
    #[strum(serialize = ":id/edit")]
    PatchBidEdit,
    #[strum(serialize = ":id/rollback/:version")]
    PutBidRollback,
    #[strum(serialize = ":id/submit_decision")]
    PatchSubmitDecision,
    #[strum(serialize = ":id/decline_decision")]
    PatchDeclineDecision,
}

impl Routable for Route {
    fn properties(&self) -> RouteProperties {
        let full_path = crate::full_path(ApiRoute::Bid, self.as_ref());
        let method = match self {
            Route::GetBidsForTender | Route::GetMyBids | Route::GetBid => http::Method::GET,
            Route::PostBid => http::Method::POST,
            Route::PatchBidStatus
            | Route::PatchBidEdit
            | Route::PatchSubmitDecision
            | Route::PatchDeclineDecision => http::Method::PATCH,
            Route::PutBidRollback => http::Method::PUT,
        };
        RouteProperties { method, full_path }
    }
}
