use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::error::StorageError;
use crate::models::Task;
use crate::repository::PersistenceAdapter;

/// Outcome of a background write, observable by an external logger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PersistenceEvent {
    Saved { tasks: usize },
    WriteFailed { error: String },
}

enum WriteCommand {
    Save(Vec<Task>),
    Flush(oneshot::Sender<()>),
}

/// Serializes saves onto one background task so they complete in the order
/// they were issued. Callers never wait on a save.
#[derive(Clone)]
pub struct PersistenceWriter {
    tx: mpsc::UnboundedSender<WriteCommand>,
    events: broadcast::Sender<PersistenceEvent>,
}

impl PersistenceWriter {
    pub fn spawn(adapter: Arc<dyn PersistenceAdapter>, runtime: &Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(64);

        runtime.spawn(run(adapter, rx, events.clone()));

        Self { tx, events }
    }

    pub fn submit(&self, tasks: Vec<Task>) {
        if self.tx.send(WriteCommand::Save(tasks)).is_err() {
            warn!("persistence writer is gone, dropping save");
            let _ = self.events.send(PersistenceEvent::WriteFailed {
                error: StorageError::WriterClosed.to_string(),
            });
        }
    }

    /// Resolves once every save submitted before this call has finished.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(done_tx))
            .map_err(|_| StorageError::WriterClosed)?;
        done_rx.await.map_err(|_| StorageError::WriterClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.events.subscribe()
    }
}

async fn run(
    adapter: Arc<dyn PersistenceAdapter>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    events: broadcast::Sender<PersistenceEvent>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Save(tasks) => {
                let event = match adapter.save(&tasks).await {
                    Ok(()) => {
                        debug!("saved {} tasks", tasks.len());
                        PersistenceEvent::Saved { tasks: tasks.len() }
                    }
                    Err(e) => {
                        error!("failed to save tasks: {}", e);
                        PersistenceEvent::WriteFailed {
                            error: e.to_string(),
                        }
                    }
                };
                // Nobody listening is fine.
                let _ = events.send(event);
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("persistence writer stopped");
}
