use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::loader::DbWordSource;
use crate::manager::DictionaryManager;

/// Which live trie a refresh channel merges into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DictTarget {
    Main,
    Stopwords,
}

impl DictTarget {
    fn as_str(self) -> &'static str {
        match self {
            DictTarget::Main => "ext_dict",
            DictTarget::Stopwords => "stopwords",
        }
    }
}

/// One incremental DB channel with its own watermark and cadence.
///
/// A channel without a watermark (first activation, or the initial full load
/// failed) performs an unconditional full query instead of scanning an
/// undefined time origin. The watermark advances to the cycle's start time
/// only after a successful merge -- also on zero rows -- so a failed cycle
/// re-processes the same window next time (at-least-once).
pub(crate) struct DbChannel {
    source: DbWordSource,
    target: DictTarget,
    period: Duration,
    watermark: Option<DateTime<Utc>>,
}

impl DbChannel {
    pub(crate) fn new(source: DbWordSource, target: DictTarget, period: Duration) -> Self {
        Self {
            source,
            target,
            period,
            watermark: None,
        }
    }

    pub(crate) async fn run_cycle(&mut self, manager: &DictionaryManager) {
        let now = Utc::now();
        let result = match self.watermark {
            None => self.source.fetch_all().await,
            Some(low) => self.source.fetch_updated_between(low, now).await,
        };
        match result {
            Ok(records) => {
                if records.is_empty() {
                    tracing::debug!(channel = self.target.as_str(), "no word changes in window");
                } else {
                    tracing::info!(
                        channel = self.target.as_str(),
                        count = records.len(),
                        "merged db words"
                    );
                    manager.merge_records(self.target, &records);
                }
                // A row updated during query execution lands in the next
                // window; consistency within one extra cycle is accepted.
                self.watermark = Some(now);
            }
            Err(error) => {
                tracing::error!(
                    %error,
                    channel = self.target.as_str(),
                    "db refresh cycle failed; watermark unchanged"
                );
            }
        }
    }
}

/// Drives the periodic refresh channels. Obtained from
/// `DictionaryManager::start_refresh`; tasks stop on `shutdown` or drop.
pub struct RefreshScheduler {
    tasks: Vec<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// A scheduler with no tasks.
    pub(crate) fn idle() -> Self {
        Self { tasks: Vec::new() }
    }

    pub(crate) fn start(manager: Arc<DictionaryManager>, channels: Vec<DbChannel>) -> Self {
        let mut tasks = Vec::new();

        if manager.config().has_remote_sources() {
            let period = manager.config().remote_refresh_period();
            let manager = Arc::clone(&manager);
            tasks.push(tokio::spawn(async move {
                // Startup already fetched every URL; skip the immediate tick.
                let mut ticker = interval_at(Instant::now() + period, period);
                loop {
                    ticker.tick().await;
                    manager.refresh_remote_once().await;
                }
            }));
        }

        for mut channel in channels {
            let manager = Arc::clone(&manager);
            tasks.push(tokio::spawn(async move {
                let period = channel.period;
                let mut ticker = interval_at(Instant::now() + period, period);
                loop {
                    ticker.tick().await;
                    channel.run_cycle(&manager).await;
                }
            }));
        }

        Self { tasks }
    }

    /// Stop all refresh tasks.
    pub fn shutdown(mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.iter().all(|task| task.is_finished())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
