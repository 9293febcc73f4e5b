//! Service lifecycle: start the listener, wait for a stop trigger, drain.
//!
//! The controller moves through `Created -> Running -> Draining -> Stopped`
//! exactly once. Whichever of an OS signal or a listener exit happens first
//! starts the shutdown; the other is dropped with the `select!` branch that lost.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use tokio::sync::oneshot;
use tracing_actix_web::TracingLogger;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

/// Path of the endpoint listing served by [`handlers`].
pub const DOCS_PATH: &str = "/docs";

/// Extra time granted after `shutdown_timeout` for worker teardown.
const STOP_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Created = 0,
    Running = 1,
    Draining = 2,
    Stopped = 3,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Created,
            1 => LifecycleState::Running,
            2 => LifecycleState::Draining,
            _ => LifecycleState::Stopped,
        }
    }
}

/// Forward-only lifecycle state shared between the controller and observers.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Created as u8),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move from `from` to `to`. Returns false if another transition got there first.
    pub fn advance(&self, from: LifecycleState, to: LifecycleState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// What started the shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownTrigger {
    Signal(&'static str),
    ListenerFailed(String),
    ListenerExited,
}

/// An HTTP server bound to its addresses but not yet accepting.
pub struct BoundServer {
    server: Server,
    addrs: Vec<SocketAddr>,
}

#[cfg(test)]
impl BoundServer {
    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn handle(&self) -> actix_web::dev::ServerHandle {
        self.server.handle()
    }
}

/// Worker drain time in whole seconds, rounded up so sub-second timeouts stay non-zero.
fn whole_seconds(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

/// Bind the HTTP listener with the configured timeouts.
pub fn bind(config: &ServerConfig, state: AppState) -> io::Result<BoundServer> {
    let http = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .client_request_timeout(config.read_timeout)
    .client_disconnect_timeout(config.write_timeout)
    .keep_alive(config.idle_timeout)
    .shutdown_timeout(whole_seconds(config.shutdown_timeout))
    .disable_signals()
    .bind((config.host.as_str(), config.port))?;

    let addrs = http.addrs();
    Ok(BoundServer {
        server: http.run(),
        addrs,
    })
}

/// Drives one server from start to stop.
pub struct ServerController {
    lifecycle: Arc<Lifecycle>,
    shutdown_timeout: Duration,
}

impl ServerController {
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            lifecycle: Arc::new(Lifecycle::new()),
            shutdown_timeout,
        }
    }

    pub fn lifecycle(&self) -> Arc<Lifecycle> {
        Arc::clone(&self.lifecycle)
    }

    /// Run `bound` until `signal` resolves or the listener exits, then drain
    /// it within the shutdown timeout and run `cleanup`.
    pub async fn run<S, C>(self, bound: BoundServer, signal: S, cleanup: C) -> ShutdownTrigger
    where
        S: Future<Output = &'static str>,
        C: Future<Output = ()>,
    {
        let BoundServer { server, addrs } = bound;
        let handle = server.handle();

        let (notify_tx, notify_rx) = oneshot::channel();
        actix_rt::spawn(async move {
            let _ = notify_tx.send(server.await);
        });
        self.lifecycle
            .advance(LifecycleState::Created, LifecycleState::Running);

        for addr in &addrs {
            tracing::info!("Server listening on http://{}", addr);
            tracing::info!("API documentation: http://{}{}", addr, DOCS_PATH);
        }

        let trigger = wait_for_trigger(signal, notify_rx).await;
        match &trigger {
            ShutdownTrigger::Signal(name) => {
                tracing::info!(signal = *name, "Received shutdown signal")
            }
            ShutdownTrigger::ListenerFailed(error) => {
                tracing::error!(error = %error, "HTTP listener failed")
            }
            ShutdownTrigger::ListenerExited => tracing::warn!("HTTP listener exited"),
        }

        if !self
            .lifecycle
            .advance(LifecycleState::Running, LifecycleState::Draining)
        {
            return trigger;
        }

        tracing::info!(
            timeout_ms = self.shutdown_timeout.as_millis() as u64,
            "Draining in-flight requests"
        );
        let bound = self.shutdown_timeout + STOP_GRACE;
        if tokio::time::timeout(bound, handle.stop(true)).await.is_err() {
            tracing::error!(
                timeout_ms = bound.as_millis() as u64,
                "Failed to stop the server within the shutdown timeout"
            );
        }

        cleanup.await;
        self.lifecycle
            .advance(LifecycleState::Draining, LifecycleState::Stopped);
        tracing::info!("Server stopped");

        trigger
    }
}

/// Wait for the first of a shutdown signal or the listener reporting its exit.
pub async fn wait_for_trigger<S>(
    signal: S,
    listener: oneshot::Receiver<io::Result<()>>,
) -> ShutdownTrigger
where
    S: Future<Output = &'static str>,
{
    tokio::select! {
        name = signal => ShutdownTrigger::Signal(name),
        exit = listener => match exit {
            Ok(Ok(())) => ShutdownTrigger::ListenerExited,
            Ok(Err(e)) => ShutdownTrigger::ListenerFailed(e.to_string()),
            Err(_) => ShutdownTrigger::ListenerFailed("listener task dropped".to_string()),
        },
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ads_infra::InMemoryAdRepository;

    use super::*;

    #[test]
    fn drain_timeout_rounds_up_to_whole_seconds() {
        assert_eq!(whole_seconds(Duration::from_millis(900)), 1);
        assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(whole_seconds(Duration::from_secs(10)), 10);
        assert_eq!(whole_seconds(Duration::ZERO), 0);
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            shutdown_timeout: Duration::from_secs(1),
            ..ServerConfig::default()
        }
    }

    fn test_state() -> AppState {
        AppState::new(Arc::new(InMemoryAdRepository::new()))
    }

    #[test]
    fn lifecycle_only_moves_forward_once() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Created);

        assert!(!lifecycle.advance(LifecycleState::Running, LifecycleState::Draining));
        assert!(lifecycle.advance(LifecycleState::Created, LifecycleState::Running));
        assert!(lifecycle.advance(LifecycleState::Running, LifecycleState::Draining));
        assert!(!lifecycle.advance(LifecycleState::Running, LifecycleState::Draining));
        assert!(lifecycle.advance(LifecycleState::Draining, LifecycleState::Stopped));
        assert!(!lifecycle.advance(LifecycleState::Draining, LifecycleState::Stopped));
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
    }

    #[actix_web::test]
    async fn signal_wins_over_idle_listener() {
        let (_tx, rx) = oneshot::channel::<io::Result<()>>();
        let trigger = wait_for_trigger(async { "SIGTERM" }, rx).await;
        assert_eq!(trigger, ShutdownTrigger::Signal("SIGTERM"));
    }

    #[actix_web::test]
    async fn listener_error_triggers_shutdown() {
        let (tx, rx) = oneshot::channel();
        tx.send(Err(io::Error::other("accept failed"))).unwrap();

        let trigger = wait_for_trigger(std::future::pending(), rx).await;
        assert_eq!(
            trigger,
            ShutdownTrigger::ListenerFailed("accept failed".to_string())
        );
    }

    #[actix_web::test]
    async fn dropped_listener_counts_as_failure() {
        let (tx, rx) = oneshot::channel::<io::Result<()>>();
        drop(tx);

        let trigger = wait_for_trigger(std::future::pending(), rx).await;
        assert!(matches!(trigger, ShutdownTrigger::ListenerFailed(_)));
    }

    #[actix_web::test]
    async fn serves_until_signal_then_stops_once() {
        let bound = bind(&test_config(), test_state()).unwrap();
        let addr = bound.addrs()[0];
        let controller = ServerController::new(Duration::from_secs(1));
        let lifecycle = controller.lifecycle();
        let cleanups = Arc::new(AtomicUsize::new(0));

        let observed = Arc::clone(&lifecycle);
        let signal = async move {
            assert_eq!(observed.state(), LifecycleState::Running);
            let health = reqwest::get(format!("http://{addr}/health")).await.unwrap();
            assert!(health.status().is_success());
            "SIGINT"
        };
        let counter = Arc::clone(&cleanups);
        let cleanup = async move {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        let trigger = controller.run(bound, signal, cleanup).await;

        assert_eq!(trigger, ShutdownTrigger::Signal("SIGINT"));
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn listener_exit_stops_without_signal() {
        let bound = bind(&test_config(), test_state()).unwrap();
        let handle = bound.handle();
        let controller = ServerController::new(Duration::from_secs(1));
        let lifecycle = controller.lifecycle();
        let cleanups = Arc::new(AtomicUsize::new(0));

        actix_rt::spawn(async move {
            actix_rt::time::sleep(Duration::from_millis(50)).await;
            handle.stop(false).await;
        });

        let counter = Arc::clone(&cleanups);
        let trigger = controller
            .run(bound, std::future::pending(), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(trigger, ShutdownTrigger::ListenerExited);
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }
}
