use {
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

pub mod bid;
pub mod review;
pub mod tender;

pub type OrganizationId = i32;
pub type Username = String;
pub type Version = i32;

#[derive(ToResponse, ToSchema, Serialize, Deserialize, Debug)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}

#[derive(ToResponse, ToSchema, Serialize, Deserialize, Debug)]
#[response(description = "The service is up")]
pub struct PingResponse {
    #[schema(example = "ok")]
    pub message: String,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "api")]
    Api,
    #[strum(serialize = "tenders")]
    Tender,
    #[strum(serialize = "bids")]
    Bid,
    #[strum(serialize = "ping")]
    Ping,
    #[strum(serialize = "")]
    Root,
    #[strum(serialize = "live")]
    Liveness,
    #[strum(serialize = "docs")]
    Docs,
}

pub struct RouteProperties {
    pub method:    http::Method,
    pub full_path: String,
}

pub trait Routable: AsRef<str> + Clone {
    fn properties(&self) -> RouteProperties;
}

/// Joins the api prefix, a resource prefix and a route suffix into an axum path.
pub(crate) fn full_path(resource: Route, suffix: &str) -> String {
    let path = format!("{}{}{}", Route::Api.as_ref(), resource.as_ref(), suffix);
    path.trim_end_matches('/').to_string()
}
