//! Web Server UI（HTML 表单 + JSON API）。

mod router;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::base_system::context::Config;
use state::AppState;

pub(crate) const ADDR_ENV: &str = "FB_UID_ADDR";

/// Starts the server and blocks until Ctrl+C.
pub fn run(config: &Config, bind_override: Option<String>) -> Result<()> {
    let bind_raw = bind_source(
        bind_override,
        std::env::var(ADDR_ENV).ok(),
        &config.bind_addr,
    );
    let bind_addrs: Vec<SocketAddr> = parse_bind_addrs(&bind_raw)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(run_async(bind_addrs, config.debug))
}

/// CLI `--bind` wins over `FB_UID_ADDR`, which wins over `bind_addr` in config.
/// Blank values are skipped.
fn bind_source(cli: Option<String>, env: Option<String>, config: &str) -> String {
    cli.into_iter()
        .chain(env)
        .find(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.to_string())
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(anyhow!("empty bind addr"));
    }

    // - IPv4: 127.0.0.1:5000
    // - IPv6: [::1]:5000
    if let Ok(a) = s.parse::<SocketAddr>() {
        return Ok(a);
    }

    // Tolerate missing brackets for IPv6, e.g. "::1:5000".
    // The last ':' segment is the port if it's all digits.
    if !s.starts_with('[')
        && let Some((host, port)) = s.rsplit_once(':')
        && !host.is_empty()
        && !port.is_empty()
        && port.chars().all(|c| c.is_ascii_digit())
        && host.contains(':')
    {
        let wrapped = format!("[{host}]:{port}");
        if let Ok(a) = wrapped.parse::<SocketAddr>() {
            return Ok(a);
        }
    }

    Err(anyhow!(
        "invalid bind addr: '{s}'. Use '127.0.0.1:5000' or '[::1]:5000' (IPv6 needs brackets). For multiple binds, separate by comma: '0.0.0.0:5000,[::]:5000'."
    ))
}

fn parse_bind_addrs(raw: &str) -> Result<Vec<SocketAddr>> {
    let parts: Vec<&str> = raw
        .split([',', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(anyhow!("empty bind addr list"));
    }

    let mut out = Vec::with_capacity(parts.len());
    for p in parts {
        let a = parse_bind_addr(p)?;
        if !out.contains(&a) {
            out.push(a);
        }
    }

    Ok(out)
}

async fn run_async(bind_addrs: Vec<SocketAddr>, debug: bool) -> Result<()> {
    let state = AppState {
        bind_addrs: Arc::new(bind_addrs.clone()),
        debug,
    };

    // Shared shutdown trigger for all listeners.
    let notify = Arc::new(Notify::new());
    {
        let notify = notify.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            notify.notify_waiters();
        });
    }

    let servers = start_listeners(&bind_addrs, &state, &notify).await?;

    println!("Press Ctrl+C to stop.");

    for h in servers {
        h.await
            .map_err(|e| anyhow!("server task join failed: {e}"))?
            .map_err(|e| anyhow!(e))?;
    }

    info!(target: "web", "server stopped");
    Ok(())
}

type ServerTask = JoinHandle<std::io::Result<()>>;

/// Binds every address and spawns one server per listener.
///
/// `AddrInUse` is fatal for the first address only; later ones are skipped.
async fn start_listeners(
    bind_addrs: &[SocketAddr],
    state: &AppState,
    notify: &Arc<Notify>,
) -> Result<Vec<ServerTask>> {
    let mut servers = Vec::new();
    for &bind in bind_addrs {
        let listener = match tokio::net::TcpListener::bind(bind).await {
            Ok(l) => l,
            Err(e) => {
                // [::]:PORT may already accept IPv4 on dual-stack hosts.
                if !servers.is_empty() && e.kind() == std::io::ErrorKind::AddrInUse {
                    warn!(target: "web", bind = %bind, error = %e, "bind failed (AddrInUse), likely already covered by another listener; skipping");
                    continue;
                }
                return Err(anyhow!(e).context(format!("bind failed: {bind}")));
            }
        };

        let local = listener.local_addr().unwrap_or(bind);
        info!(target: "web", "listening on http://{local}/ (set {ADDR_ENV} to override)");
        println!("UID extractor listening on http://{local}/");

        let app = router::build_router(state.clone());
        let notify = notify.clone();
        servers.push(tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                notify.notified().await;
            })
            .await
        }));
    }

    if servers.is_empty() {
        return Err(anyhow!("no listeners started (check bind_addr)"));
    }

    Ok(servers)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    println!("Stopping server...");
}
