//! Modal signalling between the inspection list and its dialogs.
//!
//! The list opens dialogs by sending a [`ModalIntent`] down a single
//! directed channel. The receiving side routes each variant to exactly one
//! [`ModalHandler`] method: create and edit go to the form dialog, delete to
//! the confirmation dialog.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::model::InspectionRecord;

const MODAL_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalIntent {
    Create,
    Edit(InspectionRecord),
    Delete(InspectionRecord),
}

/// Consumer of modal intents.
#[async_trait]
pub trait ModalHandler: Send {
    /// Open the form empty.
    async fn on_create(&mut self);
    /// Open the form pre-filled from `record`.
    async fn on_edit(&mut self, record: InspectionRecord);
    /// Ask to confirm deleting `record`.
    async fn on_delete(&mut self, record: InspectionRecord);
}

/// Sending half, held by the list.
#[derive(Debug, Clone)]
pub struct ModalSender {
    tx: mpsc::Sender<ModalIntent>,
}

impl ModalSender {
    pub async fn open(&self, intent: ModalIntent) -> Result<(), ClientError> {
        self.tx.send(intent).await.map_err(|_| ClientError::Stopped)
    }
}

/// Receiving half, drained by [`ModalReceiver::run`].
#[derive(Debug)]
pub struct ModalReceiver {
    rx: mpsc::Receiver<ModalIntent>,
}

pub fn modal_channel() -> (ModalSender, ModalReceiver) {
    let (tx, rx) = mpsc::channel(MODAL_BUFFER);
    (ModalSender { tx }, ModalReceiver { rx })
}

impl ModalReceiver {
    /// Route intents to `handler` until every sender is dropped or `cancel`
    /// fires.
    pub async fn run<H: ModalHandler>(mut self, handler: &mut H, cancel: CancellationToken) {
        loop {
            let intent = tokio::select! {
                _ = cancel.cancelled() => break,
                intent = self.rx.recv() => match intent {
                    Some(intent) => intent,
                    None => break,
                },
            };
            dispatch(handler, intent).await;
        }
    }
}

async fn dispatch<H: ModalHandler>(handler: &mut H, intent: ModalIntent) {
    match intent {
        ModalIntent::Create => {
            tracing::debug!("Opening create dialog");
            handler.on_create().await;
        }
        ModalIntent::Edit(record) => {
            tracing::debug!(inspection_id = record.id, "Opening edit dialog");
            handler.on_edit(record).await;
        }
        ModalIntent::Delete(record) => {
            tracing::debug!(inspection_id = record.id, "Opening delete dialog");
            handler.on_delete(record).await;
        }
    }
}
