use {
    crate::{
        metrics::{
            is_metrics,
            MetricsLayer,
        },
        server::start_server,
    },
    anyhow::Result,
    clap::Parser,
    std::io::IsTerminal,
    tracing_subscriber::{
        filter::{
            self,
            LevelFilter,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
        Layer,
    },
};

mod api;
mod bid;
mod config;
mod identity;
mod kernel;
mod metrics;
mod review;
mod server;
mod state;
mod tender;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize a Tracing Subscriber
    let log_layer = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal());

    // Use the compact formatter if we're in a terminal, otherwise use the JSON formatter.
    let log_layer = if std::io::stderr().is_terminal() {
        log_layer.compact().boxed()
    } else {
        log_layer.json().boxed()
    };

    tracing_subscriber::registry()
        .with(
            log_layer.with_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            ),
        )
        .with(MetricsLayer.with_filter(filter::filter_fn(|metadata| is_metrics(metadata, true))))
        .try_init()?;

    // Parse the command line arguments with clap, will exit automatically on `--help` or
    // with invalid arguments.
    match config::Options::parse() {
        config::Options::Run(opts) => start_server(opts).await,
    }
}
