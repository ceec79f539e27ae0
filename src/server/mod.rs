// Server module entry
// Accept loop, connection tasks and shutdown signals

pub mod connection;
pub mod listener;

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use connection::spawn_connection;
pub use listener::create_listener;

/// Accept connections until SIGINT/SIGTERM
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    run_until(listener, state, shutdown_signal()).await
}

/// Accept connections until `shutdown` completes. In-flight connections
/// keep running on their own tasks.
pub async fn run_until(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()>,
) -> std::io::Result<()> {
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    spawn_connection(stream, peer_addr, Arc::clone(&state));
                }
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            () = &mut shutdown => {
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
