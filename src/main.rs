#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use fcm_adapter::adapters::http2::ReqwestTransport;
use fcm_adapter::adapters::push::fcm::FcmConfig;
use fcm_adapter::config::Config;
use fcm_adapter::domain::{DeliveryStatus, PushResponse};
use fcm_adapter::services::DeliveryService;
use fcm_adapter::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let outcome = run(&config).instrument(tracing::info_span!("send_notification")).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "Notification was not delivered");
    }

    telemetry_guard.shutdown();
    outcome
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let fcm = FcmConfig::new(config.fcm.to_options())?;
    fcm.validate()?;
    let notification = config.message.to_notification()?;

    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(config.fcm.request_timeout_secs)));
    let service = DeliveryService::new(Arc::new(fcm), transport);

    let delivered = service.push(notification).await;
    service.shutdown().await;
    let delivered = delivered?;

    tracing::info!(
        status = %delivered.status,
        response = %delivered.response,
        name = ?delivered.name,
        "Notification processed"
    );

    if delivered.status != DeliveryStatus::Success || delivered.response != PushResponse::Success {
        anyhow::bail!("delivery failed with status {} ({})", delivered.status, delivered.response);
    }
    Ok(())
}
