use {
    crate::{
        api,
        bid,
        config::{
            Config,
            RunOptions,
        },
        kernel::db::{
            Database,
            DB,
        },
        metrics,
        review,
        state::{
            ServerState,
            Store,
        },
        tender,
    },
    anyhow::anyhow,
    futures::future::join_all,
    sqlx::postgres::PgPoolOptions,
    std::{
        future::Future,
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
};

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to listen for the shutdown signal");
        }
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;
    tracing::info!(?config, "Loaded config");

    let pool = PgPoolOptions::new()
        .max_connections(run_options.server.database_max_connections)
        .connect(&run_options.server.database_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to the database: {:?}", err))?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|err| anyhow!("Failed to run migrations: {:?}", err))?;

    let metrics_recorder = metrics::install_recorder()
        .map_err(|err| anyhow!("Failed to install the metrics recorder: {:?}", err))?;
    let server_state = Arc::new(ServerState { metrics_recorder });

    let db: Arc<dyn Database> = Arc::new(pool.clone());
    let store = Arc::new(Store {
        tender_service: tender::service::Service::new(
            db.clone(),
            tender::service::Config {
                request_timeout: config.request_timeout,
            },
        ),
        bid_service:    bid::service::Service::new(
            db.clone(),
            bid::service::Config {
                request_timeout:    config.request_timeout,
                quorum_cap:         config.decision.quorum_cap,
                bid_creation_check: config.bid_creation_check,
            },
        ),
        review_service: review::service::Service::new(
            db,
            review::service::Config {
                request_timeout: config.request_timeout,
            },
        ),
    });

    let api_loop = tokio::spawn(exit_on_error(
        "api",
        api::start_api(run_options.clone(), store),
    ));
    let metrics_loop = tokio::spawn(exit_on_error(
        "metrics",
        metrics::start_metrics(run_options, server_state),
    ));
    for result in join_all(vec![api_loop, metrics_loop]).await {
        if let Err(err) = result {
            tracing::error!(error = ?err, "Server task panicked");
        }
    }

    close_pool(pool).await;
    Ok(())
}

/// Stops every other task once one of them fails, so the process does not keep running half up.
async fn exit_on_error(
    name: &'static str,
    task: impl Future<Output = anyhow::Result<()>>,
) -> anyhow::Result<()> {
    let result = task.await;
    if let Err(err) = &result {
        tracing::error!(task = name, error = ?err, "Task failed, shutting down");
        SHOULD_EXIT.store(true, Ordering::Release);
    }
    result
}

async fn close_pool(pool: DB) {
    tracing::info!("Closing database connections...");
    pool.close().await;
}

/// Set once on ctrl-c or when a server task fails. The API and metrics servers poll it every
/// `EXIT_CHECK_INTERVAL` and stop accepting connections.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
