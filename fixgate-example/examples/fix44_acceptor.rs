//! FIX 4.4 Acceptor Example
//!
//! Listens on `FIX_HOST:FIX_PORT` and serves every connection with its own
//! session until Ctrl-C.

use fixgate::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod common;
use common::{ExampleConfig, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::server();
    let validation = if cfg.strict {
        ValidationPolicy::Strict
    } else {
        ValidationPolicy::Lenient
    };

    let acceptor = EngineBuilder::new()
        .with_bind_addr(cfg.addr())
        .with_validation(validation)
        .build()
        .await?;
    info!("FIX.4.4 acceptor listening on {}", acceptor.local_addr()?);

    let cancel = CancellationToken::new();
    let server = tokio::spawn(acceptor.run(cancel.clone()));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    cancel.cancel();
    server.await?;

    Ok(())
}
