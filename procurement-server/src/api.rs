use {
    crate::{
        bid,
        config::RunOptions,
        review,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
        tender,
    },
    anyhow::Result,
    axum::{
        handler::Handler,
        http::{
            Method,
            StatusCode,
        },
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            get,
            patch,
            post,
            put,
            MethodRouter,
        },
        Json,
        Router,
    },
    axum_prometheus::PrometheusMetricLayer,
    clap::crate_version,
    procurement_api_types::{
        bid::{
            Bid,
            BidCreate,
            BidDecisionCreate,
            BidDecisionResult,
            BidDecisionStatus,
            BidEdit,
            BidStatus,
            BidStatusUpdate,
        },
        review::{
            Review,
            ReviewCreate,
        },
        tender::{
            Tender,
            TenderCreate,
            TenderCreated,
            TenderEdit,
            TenderStatus,
            TenderStatusUpdate,
            Tenders,
        },
        ErrorBodyResponse,
        PingResponse,
        Routable,
        Route,
    },
    std::sync::{
        atomic::Ordering,
        Arc,
    },
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
};

async fn root() -> String {
    format!("Procurement Server API {}", crate_version!())
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestError {
    /// The request contained invalid parameters
    BadParameters(String),
    /// The entity is not in a state that allows the operation
    InvalidState(String),
    /// The user is not allowed to perform the operation
    Forbidden(String),
    /// The tender was not found
    TenderNotFound,
    /// The bid was not found
    BidNotFound,
    /// No employee has the given username
    UserNotFound,
    /// The entity has no history entry with this version
    VersionNotFound { version: i32 },
    /// The entity was modified by another request in the meantime
    VersionConflict,
    /// The request did not finish in time
    Timeout,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::InvalidState(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid state: {}", msg))
            }
            RestError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, format!("Permission denied: {}", msg))
            }
            RestError::TenderNotFound => (
                StatusCode::NOT_FOUND,
                "Tender with the specified id was not found".to_string(),
            ),
            RestError::BidNotFound => (
                StatusCode::NOT_FOUND,
                "Bid with the specified id was not found".to_string(),
            ),
            RestError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "User with the specified username was not found".to_string(),
            ),
            RestError::VersionNotFound { version } => (
                StatusCode::NOT_FOUND,
                format!("Version {} was not found in the history", version),
            ),
            RestError::VersionConflict => (
                StatusCode::CONFLICT,
                "The entity was modified concurrently, retry the request".to_string(),
            ),
            RestError::Timeout => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The request timed out".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_status_and_message().1)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

/// Rejects empty or blank required strings.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), RestError> {
    if value.trim().is_empty() {
        return Err(RestError::BadParameters(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Health check.
#[utoipa::path(get, path = "/api/ping", responses(
    (status = 200, body = PingResponse),
),)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "ok".to_string(),
    })
}

/// Registers handlers under the path and method of a typed route.
pub struct WrappedRouter {
    pub router: Router<Arc<Store>>,
}

impl WrappedRouter {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    pub fn route<H, T>(self, route: impl Routable, handler: H) -> Self
    where
        H: Handler<T, Arc<Store>>,
        T: 'static,
    {
        let properties = route.properties();
        let method_router: MethodRouter<Arc<Store>> = match properties.method {
            Method::GET => get(handler),
            Method::POST => post(handler),
            Method::PATCH => patch(handler),
            Method::PUT => put(handler),
            method => {
                tracing::error!(
                    method = %method,
                    path = %properties.full_path,
                    "Unsupported route method"
                );
                return self;
            }
        };
        Self {
            router: self.router.route(&properties.full_path, method_router),
        }
    }
}

pub fn get_router(store: Arc<Store>) -> Router {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    ping,
    tender::api::get_tenders,
    tender::api::get_my_tenders,
    tender::api::post_tender,
    tender::api::get_tender,
    tender::api::patch_tender_status,
    tender::api::patch_tender_edit,
    tender::api::put_tender_rollback,
    bid::api::get_bids_for_tender,
    bid::api::get_my_bids,
    bid::api::post_bid,
    bid::api::get_bid,
    bid::api::patch_bid_status,
    bid::api::patch_bid_edit,
    bid::api::put_bid_rollback,
    bid::api::patch_submit_decision,
    bid::api::patch_decline_decision,
    review::api::post_review,
    review::api::get_reviews,
    ),
    components(
    schemas(
    Bid,
    BidCreate,
    BidDecisionCreate,
    BidDecisionResult,
    BidDecisionStatus,
    BidEdit,
    BidStatus,
    BidStatusUpdate,
    ErrorBodyResponse,
    PingResponse,
    Review,
    ReviewCreate,
    Tender,
    TenderCreate,
    TenderCreated,
    TenderEdit,
    TenderStatus,
    TenderStatusUpdate,
    Tenders,
    ),
    responses(
    ErrorBodyResponse,
    ),
    ),
    tags(
    (name = "Procurement Server", description = "Organizations publish tenders, other organizations bid on them \
    and the responsible users of the bidding organization decide which bid is accepted.")
    )
    )]
    struct ApiDoc;

    let ping_path = format!("{}{}", Route::Api.as_ref(), Route::Ping.as_ref());
    let routes = Router::new()
        .route(&ping_path, get(ping))
        .merge(tender::api::get_routes())
        .merge(bid::api::get_routes())
        .merge(review::api::get_routes());

    Router::new()
        .merge(Redoc::with_url(Route::Docs.as_ref(), ApiDoc::openapi()))
        .merge(routes)
        .route(Route::Root.as_ref(), get(root))
        .route(Route::Liveness.as_ref(), get(live))
        .layer(CorsLayer::permissive())
        .layer(PrometheusMetricLayer::new())
        .with_state(store)
}

pub async fn start_api(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    let app = get_router(store);
    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(address = %run_options.server.listen_addr, "Starting API server...");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down API server...");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (RestError::BadParameters("x".to_string()), StatusCode::BAD_REQUEST),
            (RestError::InvalidState("x".to_string()), StatusCode::BAD_REQUEST),
            (RestError::Forbidden("x".to_string()), StatusCode::FORBIDDEN),
            (RestError::TenderNotFound, StatusCode::NOT_FOUND),
            (RestError::BidNotFound, StatusCode::NOT_FOUND),
            (RestError::UserNotFound, StatusCode::NOT_FOUND),
            (
                RestError::VersionNotFound { version: 3 },
                StatusCode::NOT_FOUND,
            ),
            (RestError::VersionConflict, StatusCode::CONFLICT),
            (RestError::Timeout, StatusCode::INTERNAL_SERVER_ERROR),
            (
                RestError::TemporarilyUnavailable,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.to_status_and_message().0, status, "{:?}", error);
        }
    }

    #[test]
    fn test_require_non_empty() {
        assert_eq!(require_non_empty("name", "Cleaning"), Ok(()));
        assert_eq!(
            require_non_empty("name", "  "),
            Err(RestError::BadParameters(
                "name must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn test_version_not_found_message() {
        let (_, message) = RestError::VersionNotFound { version: 4 }.to_status_and_message();
        assert_eq!(message, "Version 4 was not found in the history");
    }

    #[test]
    fn test_error_display_matches_body_message() {
        assert_eq!(
            RestError::Forbidden("user1 can not edit tender 2".to_string()).to_string(),
            "Permission denied: user1 can not edit tender 2"
        );
        assert_eq!(
            RestError::VersionConflict.to_string(),
            RestError::VersionConflict.to_status_and_message().1
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = RestError::BidNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Bid with the specified id was not found" })
        );
    }
}
