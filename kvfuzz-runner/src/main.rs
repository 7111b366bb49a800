mod telemetry;

use std::{
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use kvfuzz::{driver::Driver, service::HttpService, settings::Settings};
use tracing::{error, info};

async fn stop_on_interrupt(stop: Arc<AtomicBool>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("stopping...");
            stop.store(true, Ordering::Relaxed);
        }
        Err(error) => error!("cannot listen for interrupts, Ctrl+C will kill the process: {error}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Settings::default();
    let telemetry = telemetry::init(settings.otlp_endpoint.as_deref());

    let service = match HttpService::new(&settings.base_url) {
        Ok(service) => service,
        Err(error) => {
            error!("{error}");
            telemetry.shutdown();

            return ExitCode::FAILURE;
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    tokio::spawn(stop_on_interrupt(stop.clone()));

    info!(
        base_url = %settings.base_url,
        max_keys = settings.max_keys,
        "starting random operations against {}, press Ctrl+C to stop",
        settings.base_url
    );

    let mut driver = Driver::new(service, settings, rand::rng());
    driver.run(&stop).await;

    info!("stopped.");
    telemetry.shutdown();

    ExitCode::SUCCESS
}
