use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{info, Instrument};

use crate::config::{Config, ServeMode, ServerConfig};
use crate::error::{ExitStatus, StartupError};
use crate::http::connection::{Connection, ConnectionError};
use crate::http::dfa::TransitionTable;
use crate::http::response::Outcome;

/// Pause after an accept error that is likely to repeat (fd exhaustion and
/// the like).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Creates, binds and listens, reporting which of the three steps failed.
pub fn bind(cfg: &ServerConfig) -> Result<TcpListener, StartupError> {
    let addr = cfg.listen_addr();

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(StartupError::Socket)?;

    socket.set_reuseaddr(true).map_err(StartupError::Socket)?;
    socket.bind(addr).map_err(StartupError::Bind)?;
    socket.listen(cfg.backlog).map_err(StartupError::Listen)
}

/// Binds and serves according to `cfg.server.mode`.
pub async fn run(cfg: Config) -> Result<ExitStatus, StartupError> {
    let listener = bind(&cfg.server)?;
    let cfg = Arc::new(cfg);

    match listener.local_addr() {
        Ok(addr) => info!("Listening on {}", addr),
        Err(e) => tracing::warn!(error = %e, "Listening on unknown address"),
    }

    match cfg.server.mode {
        ServeMode::Once => {
            let status = match serve_once(&listener, cfg).await {
                Ok(Outcome::Served) => ExitStatus::Ok,
                Ok(Outcome::NotFound) => ExitStatus::File,
                Err(ConnectionError::Accept(e)) => {
                    tracing::error!(error = %e, "Accept failed, no request was handled");
                    ExitStatus::File
                }
                Err(e) => {
                    tracing::error!("Connection error: {}", e);
                    ExitStatus::File
                }
            };
            Ok(status)
        }
        ServeMode::Forever => {
            serve_forever(listener, cfg).await;
            Ok(ExitStatus::Ok)
        }
    }
}

/// Accepts a single connection and handles it to completion.
pub async fn serve_once(
    listener: &TcpListener,
    cfg: Arc<Config>,
) -> Result<Outcome, ConnectionError> {
    TransitionTable::shared();

    let (socket, peer) = listener.accept().await.map_err(ConnectionError::Accept)?;
    info!("Accepted connection from {}", peer);

    let mut conn = Connection::new(socket, cfg);
    conn.run()
        .instrument(tracing::info_span!("conn", %peer))
        .await
}

/// Accepts connections until the task is dropped, one task per connection.
///
/// At most `max_connections` are handled at a time; further clients wait in
/// the listen backlog until a permit frees up.
pub async fn serve_forever(listener: TcpListener, cfg: Arc<Config>) {
    TransitionTable::shared();
    let permits = Arc::new(Semaphore::new(cfg.server.max_connections.max(1)));

    loop {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                if let Some(pause) = accept_backoff(&e) {
                    tokio::time::sleep(pause).await;
                }
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let cfg = cfg.clone();
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, cfg);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {}", peer, e);
                }
                drop(permit);
            }
            .instrument(tracing::info_span!("conn", %peer)),
        );
    }
}

/// How long to wait before accepting again after `err`.
///
/// Errors tied to a single aborted client are retried at once; anything else
/// waits `ACCEPT_BACKOFF` so a persistent failure cannot spin the loop.
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}
