//! Signal handling for graceful shutdown.

use tokio_util::sync::CancellationToken;

/// Completes when SIGTERM or SIGINT (Ctrl+C) is received.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, initiating graceful shutdown"),
                    _ = sigint.recv() => tracing::info!("received SIGINT, initiating graceful shutdown"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "unix signal handlers unavailable; falling back to ctrl_c");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl_c handler failed; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl+C, initiating graceful shutdown");
}

/// Wait for `signal`, then cancel `token` so open streams wind down.
pub async fn cancel_on(token: CancellationToken, signal: impl std::future::Future<Output = ()>) {
    signal.await;
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_on_fires_token_after_signal() {
        let token = CancellationToken::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let waiter = tokio::spawn(cancel_on(token.clone(), async move {
            let _ = rx.await;
        }));

        assert!(!token.is_cancelled());
        tx.send(()).unwrap();
        waiter.await.unwrap();
        assert!(token.is_cancelled());
    }
}
