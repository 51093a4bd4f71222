use {
    crate::{
        bid::BidId,
        OrganizationId,
        Routable,
        Route as ApiRoute,
        RouteProperties,
        Username,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        IntoParams,
        ToResponse,
        ToSchema,
    },
};

pub type ReviewId = i32;

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[schema(example = 1)]
    pub id:              ReviewId,
    #[schema(example = 1)]
    pub bid_id:          BidId,
    #[schema(example = "user1")]
    pub username:        Username,
    #[schema(example = 1)]
    pub organization_id: OrganizationId,
    #[schema(example = "Good job!")]
    pub comment:         String,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreate {
    #[schema(example = 1)]
    pub bid_id:          BidId,
    /// The reviewer. It must have permission on the tender the bid belongs to.
    #[schema(example = "user1")]
    pub username:        Username,
    #[schema(example = 1)]
    pub organization_id: OrganizationId,
    #[schema(example = "Good job!")]
    pub comment:         String,
}

#[derive(Serialize, Deserialize, IntoParams, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GetReviewsQueryParams {
    /// The author of the reviewed bids.
    #[param(example = "user2")]
    pub author_username:    Username,
    /// The user asking. It must be responsible for the organization.
    #[param(example = "user1")]
    pub requester_username: Username,
    #[param(example = 2)]
    pub organization_id:    OrganizationId,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "feedback")]
    PostReview,
    #[strum(serialize = ":id/reviews")]
    GetReviews,
}

impl Routable for Route {
    fn properties(&self) -> RouteProperties {
        let full_path = crate::full_path(ApiRoute::Bid, self.as_ref());
        let method = match self {
            Route::PostReview => http::Method::POST,
            Route::GetReviews => http::Method::GET,
        };
        RouteProperties { method, full_path }
    }
}
