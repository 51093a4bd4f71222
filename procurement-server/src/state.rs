use {
    crate::{
        bid,
        review,
        tender,
    },
    axum_prometheus::metrics_exporter_prometheus::PrometheusHandle,
};

/// Shared state of the api handlers.
pub struct Store {
    pub tender_service: tender::service::Service,
    pub bid_service:    bid::service::Service,
    pub review_service: review::service::Service,
}

pub struct ServerState {
    pub metrics_recorder: PrometheusHandle,
}
