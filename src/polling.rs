//! Client-side polling over the session and connection-request tools.
//!
//! For hosts that cannot keep one long request open: each helper re-invokes a
//! catalog tool through a [`Dispatcher`] until the remote status is terminal.

use crate::adapters::Dispatcher;
use crate::error::ToolError;
use crate::membrane::client::with_options;
use crate::membrane::RequestOptions;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Polling cadence and limits.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Pause between two polls.
    pub interval: Duration,
    /// Overall budget; `None` polls until a terminal status.
    pub max_wait: Option<Duration>,
    /// Server-side long-poll seconds forwarded to `get-agent-session` (1..=60).
    pub server_wait: Option<u32>,
    pub cancel: Option<CancellationToken>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_wait: Some(Duration::from_secs(300)),
            server_wait: Some(30),
            cancel: None,
        }
    }
}

impl PollOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_server_wait(mut self, seconds: Option<u32>) -> Self {
        self.server_wait = seconds;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn request_options(&self) -> RequestOptions {
        RequestOptions {
            timeout: self.max_wait,
            cancel: self.cancel.clone(),
        }
    }
}

fn status_of(value: &Value) -> Option<&str> {
    value.get("status").and_then(Value::as_str)
}

/// A session is settled once it reports anything other than `running`.
pub fn session_settled(session: &Value) -> bool {
    status_of(session) != Some("running")
}

/// A connection request is settled on `success` or `error`.
pub fn connection_settled(request: &Value) -> bool {
    matches!(status_of(request), Some("success") | Some("error"))
}

/// Poll `get-agent-session` until the session leaves `running`; returns the last payload.
pub async fn wait_for_agent_session(
    dispatcher: &Dispatcher,
    session_id: &str,
    options: &PollOptions,
) -> Result<Value, ToolError> {
    let mut args = json!({ "sessionId": session_id });
    if let Some(seconds) = options.server_wait {
        args["wait"] = json!(true);
        args["timeout"] = json!(seconds);
    }
    poll(dispatcher, "get-agent-session", args, options, session_settled).await
}

/// Poll `check-connection-result` until the request succeeds or fails; returns the last payload.
pub async fn wait_for_connection_request(
    dispatcher: &Dispatcher,
    request_id: &str,
    options: &PollOptions,
) -> Result<Value, ToolError> {
    let args = json!({ "requestId": request_id });
    poll(
        dispatcher,
        "check-connection-result",
        args,
        options,
        connection_settled,
    )
    .await
}

async fn poll<F>(
    dispatcher: &Dispatcher,
    tool: &str,
    args: Value,
    options: &PollOptions,
    settled: F,
) -> Result<Value, ToolError>
where
    F: Fn(&Value) -> bool,
{
    let attempts = async {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let value = dispatcher.dispatch(tool, args.clone()).await?;
            if settled(&value) {
                info!(
                    "{} settled after {} poll(s): {}",
                    tool,
                    attempt,
                    status_of(&value).unwrap_or("<no status>")
                );
                return Ok(value);
            }
            debug!(
                "{} poll {} still {}",
                tool,
                attempt,
                status_of(&value).unwrap_or("<no status>")
            );
            tokio::time::sleep(options.interval).await;
        }
    };
    with_options(attempts, &options.request_options()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn session_settles_on_any_non_running_status() {
        assert!(!session_settled(&json!({ "status": "running" })));
        assert!(session_settled(&json!({ "status": "idle" })));
        assert!(session_settled(&json!({ "status": "aborted" })));
        assert!(session_settled(&json!({ "id": "session_1" })));
    }

    #[test]
    fn connection_settles_only_on_success_or_error() {
        assert!(!connection_settled(&json!({ "status": "pending" })));
        assert!(!connection_settled(&json!({})));
        assert!(connection_settled(&json!({ "status": "success" })));
        assert!(connection_settled(&json!({ "status": "error" })));
    }

    #[test]
    fn defaults_use_server_long_poll() {
        let options = PollOptions::default();
        assert_eq!(options.server_wait, Some(30));
        assert_eq!(options.max_wait, Some(Duration::from_secs(300)));
        assert_eq!(options.request_options().timeout, options.max_wait);
    }
}
