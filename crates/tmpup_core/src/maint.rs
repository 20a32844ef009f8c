//! Periodic removal of expired records on a dedicated thread.

use crate::db::time_util::now_seconds;
use crate::db::{Connection, OpenMode};
use crate::error::StorageError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A record kind whose expired rows can be purged.
pub trait Prune: Send + Sync {
    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    /// Delete every row expired at `now`, returning how many were removed.
    ///
    /// # Errors
    /// Returns the engine diagnostic on failure.
    fn prune(&self, now: DateTime<Utc>, conn: &mut Connection) -> Result<usize, StorageError>;
}

/// Lifecycle of the scheduler thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceState {
    Stopped,
    /// Waiting for the next tick.
    Armed,
    /// A prune pass is in flight.
    Running,
}

impl MaintenanceState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Armed,
            2 => Self::Running,
            _ => Self::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::Armed => 1,
            Self::Running => 2,
        }
    }
}

/// Outcome of one task during a prune pass.
#[derive(Debug)]
pub struct TaskReport {
    pub task: &'static str,
    pub outcome: Result<usize, StorageError>,
}

struct Shared {
    db_path: String,
    tasks: Vec<Box<dyn Prune>>,
    quiescing: AtomicBool,
    state: AtomicU8,
}

impl Shared {
    fn set_state(&self, state: MaintenanceState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    fn pass(&self) -> Result<Vec<TaskReport>, StorageError> {
        if self.quiescing.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        self.set_state(MaintenanceState::Running);
        let result = self.run_tasks();
        if !self.quiescing.load(Ordering::SeqCst) {
            self.set_state(MaintenanceState::Armed);
        }
        result
    }

    fn run_tasks(&self) -> Result<Vec<TaskReport>, StorageError> {
        let mut conn = Connection::open(&self.db_path, OpenMode::ReadWrite)?;
        let now = now_seconds();

        let reports = self
            .tasks
            .iter()
            .map(|task| {
                let outcome = task.prune(now, &mut conn);
                match &outcome {
                    Ok(0) => debug!(task = task.name(), "nothing to prune"),
                    Ok(removed) => info!(task = task.name(), removed, "pruned expired records"),
                    Err(err) => warn!(task = task.name(), "prune failed: {}", err),
                }
                TaskReport {
                    task: task.name(),
                    outcome,
                }
            })
            .collect();
        Ok(reports)
    }
}

/// Handle to the maintenance thread.
///
/// Dropping the handle stops the thread and waits for an in-flight pass.
pub struct Maintenance {
    shared: Arc<Shared>,
    stop: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Maintenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maintenance")
            .field("db_path", &self.shared.db_path)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Maintenance {
    /// Start the scheduler thread.
    ///
    /// # Arguments
    /// - `db_path`: Database opened read-write on every tick.
    /// - `interval`: Time between two prune passes.
    /// - `tasks`: Repositories pruned in order on each pass.
    ///
    /// # Returns
    /// A [`Maintenance`] handle in the [`MaintenanceState::Armed`] state.
    ///
    /// # Errors
    /// Returns an error when the thread cannot be spawned.
    pub fn start(
        db_path: impl Into<String>,
        interval: Duration,
        tasks: Vec<Box<dyn Prune>>,
    ) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            db_path: db_path.into(),
            tasks,
            quiescing: AtomicBool::new(false),
            state: AtomicU8::new(MaintenanceState::Armed.as_u8()),
        });
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name("tmpup-maintenance".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if let Err(err) = worker.pass() {
                                warn!("maintenance pass skipped: {}", err);
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                worker.set_state(MaintenanceState::Stopped);
            })?;

        debug!(interval_secs = interval.as_secs(), "maintenance armed");
        Ok(Self {
            shared,
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Current scheduler state.
    pub fn state(&self) -> MaintenanceState {
        MaintenanceState::from_u8(self.shared.state.load(Ordering::SeqCst))
    }

    /// Run one prune pass immediately on the calling thread.
    ///
    /// # Returns
    /// One report per task, empty once shutdown has begun.
    ///
    /// # Errors
    /// Returns an error when the database cannot be opened.
    pub fn run_once(&self) -> Result<Vec<TaskReport>, StorageError> {
        self.shared.pass()
    }

    /// Stop the scheduler and wait for the thread to exit.
    ///
    /// Idempotent; a pass already running completes before this returns.
    pub fn shutdown(&mut self) {
        self.shared.quiescing.store(true, Ordering::SeqCst);
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("maintenance thread panicked");
            }
        }
        self.shared.set_state(MaintenanceState::Stopped);
    }
}

impl Drop for Maintenance {
    fn drop(&mut self) {
        self.shutdown();
    }
}
