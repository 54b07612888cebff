mod cycle;
mod scheduler;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use newsbot_digest::{DeliverySettings, DeliverySink};
use newsbot_sources::{build_http_client, clients_from_config, Aggregator, RateLimiter};

use crate::cycle::{run_cycle, Output};
use crate::scheduler::{Scheduler, SchedulerState};

#[derive(Debug, Parser)]
#[command(name = "newsbot")]
#[command(about = "Periodic bilingual crypto and markets news digest")]
struct Cli {
    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Print the digest to stdout instead of posting it to the webhook.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match newsbot_core::load_app_config() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_fallback();
            tracing::error!(error = %e, "fatal configuration error");
            return Err(e.into());
        }
    };
    telemetry::init(&config)?;
    tracing::info!(
        sources_configured = config.credentials.configured_count(),
        interval_secs = config.interval_secs,
        once = cli.once,
        dry_run = cli.dry_run,
        "newsbot starting"
    );

    let clients = clients_from_config(&config).context("failed to build source clients")?;
    let mut aggregator = Aggregator::new(
        clients,
        RateLimiter::new(config.rate_limit_interval()),
    )?;
    if let Err(e) = aggregator.check_fits_interval(config.request_timeout(), config.interval()) {
        tracing::error!(error = %e, "fatal configuration error");
        return Err(e.into());
    }

    let output = if cli.dry_run {
        Output::Stdout
    } else {
        let http = build_http_client(config.request_timeout(), &config.user_agent)?;
        Output::Webhook(DeliverySink::new(
            http,
            &config.webhook_url,
            DeliverySettings::from_config(&config),
        )?)
    };

    let mut scheduler = Scheduler::new(config.interval());
    if cli.once {
        scheduler = scheduler.with_max_cycles(1);
    }

    let schedule = async {
        while let Some(cycle) = scheduler.next_cycle().await {
            run_cycle(&mut aggregator, &output, cycle).await;
            scheduler.cycle_finished();
        }
    };

    tokio::select! {
        () = schedule => tracing::info!("cycle limit reached"),
        () = shutdown_signal() => {},
    }

    tracing::info!(
        cycles = scheduler.cycles_started(),
        interrupted_mid_cycle = scheduler.state() == SchedulerState::Running,
        "newsbot stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
