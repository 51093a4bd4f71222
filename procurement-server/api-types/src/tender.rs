use {
    crate::{
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
        IntoParams,
        ToResponse,
        ToSchema,
    },
};

pub type TenderId = i32;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenderStatus {
    /// The tender is a draft, visible only to its creator.
    Created,
    /// The tender is open and accepts bids.
    Published,
    /// The tender is closed, either manually or because a bid was accepted.
    Closed,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    #[schema(example = 1)]
    pub id:               TenderId,
    #[schema(example = "Office cleaning")]
    pub name:             String,
    #[schema(example = "Daily cleaning of the head office")]
    pub description:      String,
    #[schema(example = "Delivery")]
    pub service_type:     String,
    pub status:           TenderStatus,
    #[schema(example = 1)]
    pub organization_id:  OrganizationId,
    #[schema(example = "user1")]
    pub creator_username: Username,
    /// Incremented on every edit and rollback.
    #[schema(example = 1)]
    pub version:          Version,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TenderCreate {
    #[schema(example = "Office cleaning")]
    pub name:             String,
    #[schema(example = "Daily cleaning of the head office")]
    pub description:      String,
    #[schema(example = "Delivery")]
    pub service_type:     String,
    /// The organization the tender is published on behalf of.
    /// The creator must be responsible for it.
    #[schema(example = 1)]
    pub organization_id:  OrganizationId,
    #[schema(example = "user1")]
    pub creator_username: Username,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TenderCreated {
    #[schema(example = "Tender created successfully")]
    pub message: String,
    pub tender:  Tender,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Tenders {
    #[schema(example = "List of tenders")]
    pub message: String,
    pub tenders: Vec<Tender>,
}

/// Fields left out of the body keep their current value.
#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenderEdit {
    #[schema(example = "Office cleaning, weekends included")]
    pub name:         Option<String>,
    pub description:  Option<String>,
    pub service_type: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
pub struct TenderStatusUpdate {
    /// Only PUBLISHED and CLOSED can be set directly.
    pub status: TenderStatus,
}

#[derive(Serialize, Deserialize, IntoParams, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GetTendersQueryParams {
    /// Only return tenders with this service type.
    #[param(example = "Delivery")]
    pub service_type: Option<String>,
}

#[derive(Serialize, Deserialize, IntoParams, Clone, Debug)]
#[into_params(parameter_in = Query)]
pub struct UsernameQueryParams {
    #[param(example = "user1")]
    pub username: Username,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "")]
    GetTenders,
    #[strum(serialize = "my")]
    GetMyTenders,
    #[strum(serialize = "new")]
    PostTender,
    #[strum(serialize = ":id")]
    GetTender,
    #[strum(serialize = "status/:id")]
    PatchTenderStatus,
    #[strum(serialize = ":id/edit")]
    PatchTenderEdit,
    #[strum(serialize = ":id/rollback/:version")]
    PutTenderRollback,
}

impl Routable for Route {
    fn properties(&self) -> RouteProperties {
        let full_path = crate::full_path(ApiRoute::Tender, self.as_ref());
        let method = match self {
            Route::GetTenders | Route::GetMyTenders | Route::GetTender => http::Method::GET,
            Route::PostTender => http::Method::POST,
            Route::PatchTenderStatus | Route::PatchTenderEdit => http::Method::PATCH,
            Route::PutTenderRollback => http::Method::PUT,
        };
        RouteProperties { method, full_path }
    }
}
