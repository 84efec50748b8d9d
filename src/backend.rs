use crate::app::{BackendEvent, BackendTask};
use crate::infra::ChangeOracle;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub(crate) async fn worker_loop(
    oracle: Arc<dyn ChangeOracle>,
    mut task_rx: UnboundedReceiver<BackendTask>,
    event_tx: UnboundedSender<BackendEvent>,
) {
    while let Some(task) = task_rx.recv().await {
        match task {
            BackendTask::LoadChanges { root, head, base } => {
                let o = oracle.clone();
                let result = tokio::task::spawn_blocking(move || {
                    o.changed_paths(&root, head.as_deref(), &base)
                })
                .await;

                let event = match result {
                    Ok(changed) => BackendEvent::ChangesLoaded { changed },
                    Err(err) => BackendEvent::Error {
                        context: "changes".to_string(),
                        message: format!("join error: {err}"),
                    },
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        }
    }
}
