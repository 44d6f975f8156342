//! Periodic connectivity check.

use super::AiService;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Default check interval.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(30);

const UNKNOWN: u8 = 0;
const CONNECTED: u8 = 1;
const DISCONNECTED: u8 = 2;

/// Checks the active provider on a background thread until stopped.
///
/// Each check goes through [`AiService::test_connection`], so results are
/// also published as connection events. Checks run immediately on start and
/// then once per interval.
pub struct ConnectionMonitor {
    status: Arc<AtomicU8>,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ConnectionMonitor {
    /// Starts probing every `interval`.
    #[must_use]
    pub fn start(ai: Arc<AiService>, interval: Duration) -> Self {
        Self::start_with_listener(ai, interval, |_| {})
    }

    /// Starts probing and calls `listener` with every result.
    #[must_use]
    pub fn start_with_listener<F>(ai: Arc<AiService>, interval: Duration, listener: F) -> Self
    where
        F: Fn(bool) + Send + 'static,
    {
        let status = Arc::new(AtomicU8::new(UNKNOWN));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread_status = Arc::clone(&status);

        let handle = std::thread::Builder::new()
            .name("connection-monitor".to_string())
            .spawn(move || {
                loop {
                    let connected = ai.test_connection();
                    thread_status.store(
                        if connected { CONNECTED } else { DISCONNECTED },
                        Ordering::Release,
                    );
                    listener(connected);

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {},
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("Connection monitor stopped");
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to start connection monitor");
                None
            },
        };

        Self {
            status,
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Result of the latest check, or `None` before the first completes.
    #[must_use]
    pub fn last_status(&self) -> Option<bool> {
        match self.status.load(Ordering::Acquire) {
            CONNECTED => Some(true),
            DISCONNECTED => Some(false),
            _ => None,
        }
    }

    /// Returns `true` while the monitor thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the monitor and waits for an in-flight check to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Connection monitor thread panicked");
            }
        }
    }
}

impl Drop for ConnectionMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfigStore, OllamaConfig, ProviderConfig};
    use crate::llm::LlmHttpConfig;
    use std::sync::Mutex;
    use std::time::Instant;

    fn offline_ai() -> Arc<AiService> {
        let store = MemoryConfigStore::with_active(ProviderConfig::Ollama(OllamaConfig {
            url: crate::test_support::closed_port_url(),
            model: "llama3.2".to_string(),
        }));
        Arc::new(AiService::with_http_config(
            Arc::new(store),
            LlmHttpConfig {
                timeout_ms: 300,
                connect_timeout_ms: 200,
                check_timeout_ms: 200,
            },
        ))
    }

    #[test]
    fn test_monitor_reports_and_stops() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let monitor = ConnectionMonitor::start_with_listener(
            offline_ai(),
            Duration::from_millis(20),
            move |connected| sink.lock().unwrap().push(connected),
        );

        let deadline = Instant::now() + Duration::from_secs(10);
        while seen.lock().unwrap().len() < 2 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(monitor.last_status(), Some(false));
        assert!(seen.lock().unwrap().iter().all(|c| !c));
        assert!(monitor.is_running());
        monitor.stop();
        assert!(seen.lock().unwrap().len() >= 2);
    }

    #[test]
    fn test_drop_stops_thread() {
        let monitor = ConnectionMonitor::start(offline_ai(), Duration::from_secs(3600));
        assert!(monitor.is_running());
        drop(monitor);
    }
}
