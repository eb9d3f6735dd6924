use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("{action} did not finish within {waited:?}; helper thread left detached")]
    Hung { action: String, waited: Duration },

    #[error("{action} helper thread died before reporting a result")]
    Died { action: String },

    #[error("failed to spawn helper thread for {action}: {source}")]
    Spawn {
        action: String,
        source: std::io::Error,
    },
}

/// Run `f` on a named helper thread and wait up to `timeout` for its
/// result. A hang comes back as [`WatchdogError::Hung`] with the helper
/// left detached, so the caller can report it instead of blocking
/// forever.
pub fn join_timeout<T, F>(action: &str, timeout: Duration, f: F) -> Result<T, WatchdogError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name(format!("watchdog-{}", action))
        .spawn(move || {
            let _ = tx.send(f());
        })
        .map_err(|e| WatchdogError::Spawn {
            action: action.to_string(),
            source: e,
        })?;

    match rx.recv_timeout(timeout) {
        Ok(value) => Ok(value),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!(action, ?timeout, "helper thread is hung; detaching");
            Err(WatchdogError::Hung {
                action: action.to_string(),
                waited: timeout,
            })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(WatchdogError::Died {
            action: action.to_string(),
        }),
    }
}
