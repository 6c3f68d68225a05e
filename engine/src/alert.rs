use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use log::{info, warn};
use tokio::{
    spawn,
    sync::mpsc::{
        self,
        error::{TryRecvError, TrySendError},
    },
    time::sleep,
};

use crate::event::EventKind;

/// How many alerts may wait for delivery before new ones are dropped.
const QUEUE_CAPACITY: usize = 64;

/// How often the delivery worker drains the queue.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Alert-worthy membership changes. Moving between zones does not alert.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlertKind {
    Entry,
    Exit,
}

impl AlertKind {
    /// The alert kind for an event kind, if that kind alerts at all.
    pub fn from_event(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Entered => Some(Self::Entry),
            EventKind::Exited => Some(Self::Exit),
            EventKind::Moved => None,
        }
    }
}

/// An alert queued for presentation.
#[derive(Clone, PartialEq, Debug)]
pub struct Alert {
    pub object_id: u64,
    pub zone_label: String,
    pub kind: AlertKind,
}

/// Presents delivered alerts; implementations decide the medium.
pub trait AlertSink: Send {
    fn deliver(&self, alert: &Alert);
}

/// Logs entry alerts at warn level and exit alerts at info level.
#[derive(Clone, Copy, Default, Debug)]
pub struct ConsoleAlertSink;

impl AlertSink for ConsoleAlertSink {
    fn deliver(&self, alert: &Alert) {
        match alert.kind {
            AlertKind::Entry => {
                warn!(target: "alert", "ALERT: Object {} entered {}", alert.object_id, alert.zone_label)
            }
            AlertKind::Exit => {
                info!(target: "alert", "Object {} exited {}", alert.object_id, alert.zone_label)
            }
        }
    }
}

/// Hands alerts from the tracking loop to a polling delivery worker.
///
/// The producer side never blocks: pushing into a full queue drops the alert
/// with a warning. The worker drains the queue in FIFO order on every poll
/// until the running flag is cleared. Shutdown leaves the worker one final
/// poll to drain what is already queued; alerts pushed after that are
/// dropped.
#[derive(Debug)]
pub struct AlertDispatcher {
    tx: mpsc::Sender<Alert>,
    running: Arc<AtomicBool>,
}

impl AlertDispatcher {
    /// Spawns the delivery worker on the current runtime and returns the
    /// producer handle.
    pub fn spawn(sink: impl AlertSink + 'static) -> Self {
        Self::with_capacity(sink, QUEUE_CAPACITY)
    }

    fn with_capacity(sink: impl AlertSink + 'static, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel(capacity);
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = running.clone();
        spawn(async move {
            while worker_running.load(Ordering::Acquire) {
                loop {
                    match rx.try_recv() {
                        Ok(alert) => sink.deliver(&alert),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return,
                    }
                }
                sleep(POLL_INTERVAL).await;
            }
        });
        Self { tx, running }
    }

    /// Queues `alert` without blocking.
    pub fn push(&self, alert: Alert) {
        match self.tx.try_send(alert) {
            Ok(()) => (),
            Err(TrySendError::Full(alert)) => {
                warn!(target: "alert", "alert queue full, dropping alert for object {}", alert.object_id)
            }
            Err(TrySendError::Closed(_)) => {
                warn!(target: "alert", "alert worker already stopped")
            }
        }
    }

    /// Stops the worker after one more poll, so anything already queued is
    /// still delivered.
    pub async fn shutdown(&self) {
        sleep(POLL_INTERVAL).await;
        self.running.store(false, Ordering::Release);
    }
}
