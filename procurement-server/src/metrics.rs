use {
    crate::{
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::ServerState,
    },
    anyhow::Result,
    axum::{
        routing::get,
        Router,
    },
    axum_prometheus::{
        metrics,
        metrics_exporter_prometheus::{
            Matcher,
            PrometheusBuilder,
            PrometheusHandle,
        },
        PrometheusMetricLayerBuilder,
    },
    std::{
        fmt::Debug,
        sync::{
            atomic::Ordering,
            Arc,
        },
        time::Instant,
    },
    tracing::{
        field::{
            Field,
            Visit,
        },
        span::{
            Attributes,
            Record,
        },
        Id,
        Metadata,
        Subscriber,
    },
    tracing_subscriber::{
        layer::Context,
        registry::LookupSpan,
        Layer,
    },
};

/// Decisions on bids, labelled by `decision` and by what the decision did to the bid.
pub const DECISIONS_TOTAL: &str = "decisions_total";

pub const DB_QUERY_DURATION_BUCKETS: &[f64; 12] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Installs the global Prometheus recorder that every `metrics` macro of the process reports to.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("db_queries_duration_seconds".to_string()),
            DB_QUERY_DURATION_BUCKETS,
        )?
        .install_recorder()?;
    Ok(handle)
}

/// Spans with this target and a `tracing_enabled` field are timed by [`MetricsLayer`].
pub const METRICS_TARGET: &str = "metrics";

/// What [`MetricsLayer`] keeps on a span between its creation and its close.
#[derive(Debug)]
struct SpanTiming {
    category:   Option<String>,
    operation:  String,
    result:     String,
    started_at: Instant,
}

impl SpanTiming {
    fn start(span_name: &str) -> Self {
        Self {
            category:   None,
            operation:  span_name.to_string(),
            result:     "unknown".to_string(),
            started_at: Instant::now(),
        }
    }

    fn labels(&self) -> [(&'static str, String); 2] {
        [
            ("name", self.operation.clone()),
            ("result", self.result.clone()),
        ]
    }
}

impl Visit for SpanTiming {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "category" => self.category = Some(value.to_string()),
            "name" => self.operation = value.to_string(),
            "result" => self.result = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "result" {
            self.result = format!("{:?}", value);
        }
    }
}

pub fn is_metrics(metadata: &Metadata, check_tracing_enabled: bool) -> bool {
    metadata.target().starts_with(METRICS_TARGET)
        && (!check_tracing_enabled || metadata.fields().field("tracing_enabled").is_some())
}

/// Records the latency and the count of every closed span that carries a `category`.
///
/// The `result` field is set to `success` when the span opens and rewritten by the
/// database layer when a query fails.
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            tracing::error!(?id, "Opened span is not registered");
            return;
        };
        let mut timing = SpanTiming::start(span.metadata().name());
        attrs.record(&mut timing);
        span.extensions_mut().replace(timing);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(timing) = span.extensions_mut().get_mut::<SpanTiming>() {
            values.record(timing);
        };
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let extensions = span.extensions();
        let Some(timing) = extensions.get::<SpanTiming>() else {
            tracing::warn!(?id, "Closed span was never timed");
            return;
        };
        let Some(category) = &timing.category else {
            return;
        };
        let labels = timing.labels();
        metrics::histogram!(format!("{}_duration_seconds", category), &labels)
            .record(timing.started_at.elapsed().as_secs_f64());
        metrics::counter!(format!("{}_total", category), &labels).increment(1);
    }
}

/// Serves the recorded metrics over `/metrics` in the Prometheus text format.
pub async fn start_metrics(run_options: RunOptions, server_state: Arc<ServerState>) -> Result<()> {
    tracing::info!("Starting Metrics Server...");

    let (_, metric_handle) = PrometheusMetricLayerBuilder::new()
        .with_metrics_from_fn(|| server_state.metrics_recorder.clone())
        .build_pair();
    let app = Router::new();
    let app = app.route("/metrics", get(|| async move { metric_handle.render() }));

    let listener = tokio::net::TcpListener::bind(&run_options.server.metrics_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down metrics server...");
        })
        .await?;
    Ok(())
}
