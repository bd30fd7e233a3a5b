mod email;
mod error;
mod model;
mod notify;
mod observability;
mod prompt;
mod routes;
mod server_config;
mod sink;
mod state;
mod summary;
#[cfg(test)]
mod testing;
mod ticket;
mod util;

use std::{env, net::SocketAddr};

use anyhow::Context;
use mimalloc::MiMalloc;
use observability::{category_table, ConsoleObserver, TracingObserver};
use routes::AppRouter;
use server_config::{Credentials, ServerConfig};
use state::{AppContext, Pipeline, RunOptions};
use tokio::signal;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub type HttpClient = reqwest::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logs = env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_ansi(false)))
        .init();

    let config = ServerConfig::load().context("Failed to load configuration")?;
    tracing::debug!("{}", config);

    let http_client = reqwest::ClientBuilder::new().use_rustls_tls().build()?;
    let ctx = AppContext::builder()
        .with_config(config)
        .with_http_client(http_client)
        .with_credentials(Credentials::from_env())
        .build()
        .await;

    if env::var("RUN_SERVER").is_ok_and(|v| v == "true") {
        println!("-------- RUNNING SERVER --------");
        return run_server(ctx).await;
    }

    run_batch(&ctx).await
}

/// The zero-argument batch run: fetch, classify, sink and summarize once.
async fn run_batch(ctx: &AppContext) -> anyhow::Result<()> {
    let rule = "=".repeat(70);
    println!("\n{}", rule);
    println!("🔧 AI MAINTENANCE SUPERVISOR - Starting Analysis...");
    println!("{}\n", rule);

    let observer = ConsoleObserver::new();
    let options = RunOptions {
        limit: ctx.config().settings.max_results,
        send_notifications: true,
    };
    let outcome = Pipeline::new(ctx, &observer)
        .run(options)
        .await
        .context("Mail source unavailable")?;

    if outcome.processed > 0 {
        println!("\n{}", rule);
        println!("✅ Maintenance analysis complete!");
        println!("   Processed: {} issues", outcome.processed);
        println!("{}\n", rule);
        print!("{}", category_table(&outcome.issues));
    }

    Ok(())
}

async fn run_server(ctx: AppContext) -> anyhow::Result<()> {
    let mut scheduler = JobScheduler::new().await?;

    if let Some(cron) = ctx.config().schedule.cron.clone() {
        let job_ctx = ctx.clone();
        scheduler
            .add(Job::new_async(cron.as_str(), move |uuid, mut l| {
                let ctx = job_ctx.clone();
                Box::pin(async move {
                    tracing::info!("Running scheduled batch {}", uuid);
                    let options = RunOptions {
                        limit: ctx.config().settings.max_results,
                        send_notifications: true,
                    };
                    match Pipeline::new(&ctx, &TracingObserver).run(options).await {
                        Ok(outcome) => {
                            tracing::info!(
                                "Scheduled batch {} processed {} issue(s)",
                                uuid,
                                outcome.processed
                            );
                        }
                        Err(e) => {
                            tracing::error!("Scheduled batch {} failed: {}", uuid, e);
                        }
                    }

                    let next_tick = l.next_tick_for_job(uuid).await;
                    if let Ok(Some(ts)) = next_tick {
                        tracing::info!("Next scheduled batch is {:?}", ts)
                    }
                })
            })?)
            .await?;

        scheduler.set_shutdown_handler(Box::new(move || {
            Box::pin(async move {
                tracing::info!("Shutting down scheduler");
            })
        }));

        scheduler.start().await?;
        tracing::info!("Scheduled batch runs on {:?}", cron);
    }

    let router = AppRouter::create(ctx.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.config().server.port));
    tracing::info!("Maintenance supervisor API running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(scheduler))
        .await?;

    Ok(())
}

async fn shutdown_signal(mut scheduler: JobScheduler) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    if let Err(e) = scheduler.shutdown().await {
        tracing::error!("Failed to shut down scheduler: {:?}", e);
    }
    println!("Cleanups done, shutting down");
}
