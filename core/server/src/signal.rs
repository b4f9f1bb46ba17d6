// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

/// Completes when the server should begin shutting down.
pub async fn shutdown() {
    imp::shutdown().await
}

#[cfg(unix)]
mod imp {
    use tokio::signal::unix::{signal, SignalKind};
    use tracing::info;

    pub(super) async fn shutdown() {
        tokio::select! {
            // Ctrl-C while developing.
            () = sig(SignalKind::interrupt(), "SIGINT") => {}
            // What an orchestrator sends to begin a graceful stop.
            () = sig(SignalKind::terminate(), "SIGTERM") => {}
        };
    }

    async fn sig(kind: SignalKind, name: &'static str) {
        signal(kind)
            .expect("failed to register signal handler")
            .recv()
            .await;
        info!(target: "tram::signal", "received {}, starting shutdown", name);
    }
}

#[cfg(not(unix))]
mod imp {
    use tracing::info;

    pub(super) async fn shutdown() {
        // Windows only has Ctrl-C; good enough to develop against.
        tokio::signal::windows::ctrl_c()
            .expect("failed to register signal handler")
            .recv()
            .await;
        info!(target: "tram::signal", "received Ctrl-C, starting shutdown");
    }
}
