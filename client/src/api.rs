//! HTTP client for the simulation backend's two endpoints.

use std::fmt;

use gloo_net::http::Request;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::AbortController;

use hexfront_shared::{Command, Snapshot};

pub const STATE_URL: &str = "/api/state";
pub const CONTROL_URL: &str = "/api/control";

/// Abort a state poll that outlives this budget. A hung backend must cost
/// one frame, not freeze the render loop forever.
pub const STATE_TIMEOUT_MS: u32 = 4_000;
const RETRY_BACKOFF_MS: u32 = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network failure, abort, or non-success HTTP status.
    Transport(String),
    /// Response arrived but the body is not a well-formed snapshot.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(detail) => write!(f, "transport error: {detail}"),
            FetchError::Decode(detail) => write!(f, "decode error: {detail}"),
        }
    }
}

/// Health of the poll cycle, as shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Connecting,
    Live,
    /// Transport trouble: the backend is unreachable or timing out.
    Stalled,
    /// The backend answers but its snapshots are unusable.
    Degraded,
}

impl PollStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PollStatus::Connecting => "connecting",
            PollStatus::Live => "live",
            PollStatus::Stalled => "stalled",
            PollStatus::Degraded => "degraded",
        }
    }
}

async fn fetch_state_once() -> Result<Snapshot, FetchError> {
    let controller = AbortController::new().ok();
    let signal = controller.as_ref().map(|c| c.signal());
    // Dropping the timeout cancels it, so a response inside the budget
    // never triggers the abort.
    let _timeout = controller.clone().map(|c| {
        gloo_timers::callback::Timeout::new(STATE_TIMEOUT_MS, move || c.abort())
    });

    let resp = Request::get(STATE_URL)
        .abort_signal(signal.as_ref())
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Transport(format!("HTTP {}", resp.status())));
    }

    // Read the body first so a connection dropped mid-body stays a transport
    // error; only an intact-but-malformed body is a decode error.
    let body = resp
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    serde_json::from_str::<Snapshot>(&body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Fetch the current snapshot. Transport failures retry once after a short
/// backoff; decode failures do not, since a malformed body will not improve
/// on retry.
pub async fn fetch_state() -> Result<Snapshot, FetchError> {
    match fetch_state_once().await {
        Err(FetchError::Transport(first)) => {
            gloo_timers::future::TimeoutFuture::new(RETRY_BACKOFF_MS).await;
            fetch_state_once().await.map_err(|retry| match retry {
                FetchError::Transport(second) => {
                    FetchError::Transport(format!("{first}; retry: {second}"))
                }
                other => other,
            })
        }
        other => other,
    }
}

/// Issue a control command, fire-and-forget. The caller never awaits
/// completion; failures are logged and flagged on the poll status so they
/// are not silently swallowed.
pub fn send_control(command: Command, health: RwSignal<PollStatus>) {
    spawn_local(async move {
        if let Err(e) = post_control(command).await {
            web_sys::console::warn_1(
                &format!("control command '{}' failed: {e}", command.name()).into(),
            );
            health.set(PollStatus::Stalled);
        }
    });
}

async fn post_control(command: Command) -> Result<(), FetchError> {
    let resp = Request::post(CONTROL_URL)
        .json(&command.payload())
        .map_err(|e| FetchError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Transport(format!("HTTP {}", resp.status())));
    }
    Ok(())
}
