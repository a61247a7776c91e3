//! Loopback callback server.
//!
//! Binds the host and port of the configured redirect URI, waits for the
//! provider to redirect the browser back, and hands the raw query
//! parameters to the caller. Validation of `code` and `state` stays in
//! `flowlab_core::CallbackValidator`; this server only captures.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::RawQuery;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use flowlab_core::CallbackParams;
use flowlab_domain::{FlowError, Result};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use url::Url;

type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

const RECEIVED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>flowlab</title></head>
<body><h1>Callback received</h1><p>You can close this window and return to the terminal.</p></body>
</html>"#;

const ALREADY_RECEIVED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>flowlab</title></head>
<body><h1>Callback ignored</h1><p>A callback was already captured for this login.</p></body>
</html>"#;

/// Loopback server capturing a single authorization callback.
pub struct CallbackServer {
    local_addr: SocketAddr,
    path: String,
    callback_rx: Option<oneshot::Receiver<CallbackParams>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Start a server for the host, port and path of `redirect_uri`.
    ///
    /// # Errors
    /// Returns `FlowError::Config` if the URI cannot be resolved to a
    /// socket address and `FlowError::Network` if binding fails.
    pub async fn for_redirect_uri(redirect_uri: &str) -> Result<Self> {
        let url = Url::parse(redirect_uri)
            .map_err(|e| FlowError::Config(format!("Invalid redirect URI: {e}")))?;

        let addr = url
            .socket_addrs(|| match url.scheme() {
                "https" => Some(443),
                _ => Some(80),
            })
            .map_err(|e| FlowError::Config(format!("Cannot resolve redirect URI host: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| FlowError::Config("Redirect URI resolves to no address".into()))?;

        Self::bind(addr, url.path()).await
    }

    /// Start a server on `addr` answering `GET <path>`.
    ///
    /// Port `0` binds an ephemeral port; see [`Self::callback_url`].
    pub async fn bind(addr: SocketAddr, path: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|err| {
            FlowError::Network(format!("failed to bind callback server on {addr}: {err}"))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|err| FlowError::Network(format!("failed to determine address: {err}")))?;

        let path = if path.is_empty() { "/".to_string() } else { path.to_string() };

        let (callback_tx, callback_rx) = oneshot::channel();
        let slot: CallbackSlot = Arc::new(Mutex::new(Some(callback_tx)));

        let app = Router::new().route(
            &path,
            get(move |query: RawQuery| handle_callback(query, slot.clone())),
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("callback server error: {}", err);
            }
        });

        info!(addr = %local_addr, path = %path, "callback server listening");

        Ok(Self {
            local_addr,
            path,
            callback_rx: Some(callback_rx),
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL the server answers on, using the bound address.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("http://{}{}", self.local_addr, self.path)
    }

    /// Await the callback with a timeout.
    ///
    /// # Errors
    /// Returns `FlowError::Network` on timeout, if the server stopped
    /// before a callback arrived, or if the callback was already taken.
    pub async fn wait_for_callback(&mut self, timeout: Duration) -> Result<CallbackParams> {
        let rx = self
            .callback_rx
            .as_mut()
            .ok_or_else(|| FlowError::Network("callback already received".into()))?;

        let params = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(params)) => params,
            Ok(Err(_)) => {
                return Err(FlowError::Network("callback server stopped".into()));
            }
            Err(_) => {
                return Err(FlowError::Network(format!(
                    "timed out after {}s waiting for the authorization callback",
                    timeout.as_secs()
                )));
            }
        };

        self.callback_rx = None;
        Ok(params)
    }

    /// Shut down the server gracefully.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(FlowError::Network(format!("callback server panicked: {err}")));
                }
            }
        }

        Ok(())
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

async fn handle_callback(RawQuery(query): RawQuery, slot: CallbackSlot) -> Html<&'static str> {
    let params = CallbackParams::from_query(query.as_deref().unwrap_or_default());

    // First callback wins; later hits (favicon retries, reloads) are ignored.
    let Some(tx) = slot.lock().take() else {
        debug!("ignoring repeated callback");
        return Html(ALREADY_RECEIVED_PAGE);
    };

    if tx.send(params).is_err() {
        debug!("callback receiver dropped");
    }
    Html(RECEIVED_PAGE)
}
