//! One fetch → summarize → deliver pass.

use chrono::Utc;
use newsbot_digest::{summarize, DeliveryReport, DeliverySink};
use newsbot_sources::Aggregator;
use tracing::Instrument;

/// Where a finished digest goes.
#[derive(Debug)]
pub enum Output {
    Webhook(DeliverySink),
    /// `--dry-run`: print to stdout.
    Stdout,
}

/// What happened in one cycle, for logging and tests.
#[derive(Debug)]
pub struct CycleSummary {
    pub sources: usize,
    pub failed_sources: usize,
    pub digest_chars: usize,
    /// `None` for stdout output or when delivery failed.
    pub delivery: Option<DeliveryReport>,
}

/// Runs one cycle. Never fails: source and delivery errors are logged and
/// the schedule carries on.
pub async fn run_cycle(aggregator: &mut Aggregator, output: &Output, cycle: u64) -> CycleSummary {
    let span = tracing::info_span!("cycle", cycle);
    async move {
        tracing::info!("cycle started");
        let outcomes = aggregator.run_cycle().await;
        let digest = summarize(&outcomes, Utc::now());

        let delivery = match output {
            Output::Stdout => {
                println!("{digest}");
                None
            }
            Output::Webhook(sink) => match sink.deliver(&digest).await {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::error!(error = %e, "digest not delivered; will try again next cycle");
                    None
                }
            },
        };

        let summary = CycleSummary {
            sources: outcomes.len(),
            failed_sources: outcomes.values().filter(|o| !o.is_success()).count(),
            digest_chars: digest.char_len(),
            delivery,
        };
        tracing::info!(
            sources = summary.sources,
            failed_sources = summary.failed_sources,
            digest_chars = summary.digest_chars,
            delivered = summary.delivery.is_some(),
            "cycle finished"
        );
        summary
    }
    .instrument(span)
    .await
}
