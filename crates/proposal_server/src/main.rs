//! Proposal response server entry point.
//!
//! # Responsibility
//! - Load configuration, start logging, open the store, build the notifier.
//! - Serve the HTTP router until Ctrl-C.

use log::{error, info};
use proposal_core::{
    build_notifier, init_logging, open_store, Notifier, ResponseService, ServiceConfig,
};
use proposal_server::{router, AppState, DynResponseService};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    let config = ServiceConfig::from_env()?;
    init_logging(config.log_level, config.log_dir.as_deref())?;

    let store = open_store(&config.storage)?;
    // The blocking HTTP client must be created outside the async runtime.
    let notifier = build_notifier(&config.notifier)?;
    info!(
        "event=service_init module=server status=ok storage={:?} notifier={}",
        config.storage,
        notifier.channel()
    );

    let service: Arc<DynResponseService> = Arc::new(ResponseService::new(store, notifier));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(&config, Arc::clone(&service)));
    drop(runtime);

    if let Err(err) = &result {
        error!("event=server_stop module=server status=error error={err}");
    }
    result
}

async fn serve(
    config: &ServiceConfig,
    service: Arc<DynResponseService>,
) -> Result<(), Box<dyn Error>> {
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;
    info!("event=server_start module=server status=ok addr=http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=server status=error error={err}");
    }
}
