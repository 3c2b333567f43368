use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::debug;

use super::backend::Backend;
use super::commands::{ApiCmd, ApiFeedback};
use crate::schema::{Registry, SchemaKind};

/// Receives requests and runs each on its own short-lived thread, so a slow
/// chain fetch never holds up a tempo poll.
pub(crate) struct ApiThread {
    backend: Arc<dyn Backend>,
    cmd_rx: Receiver<ApiCmd>,
    feedback_tx: Sender<ApiFeedback>,
}

impl ApiThread {
    pub(crate) fn new(backend: Arc<dyn Backend>, cmd_rx: Receiver<ApiCmd>, feedback_tx: Sender<ApiFeedback>) -> Self {
        Self { backend, cmd_rx, feedback_tx }
    }

    pub(crate) fn run(self) {
        while let Ok(cmd) = self.cmd_rx.recv() {
            if matches!(cmd, ApiCmd::Shutdown) {
                break;
            }
            let backend = Arc::clone(&self.backend);
            let feedback_tx = self.feedback_tx.clone();
            thread::spawn(move || {
                if let Some(feedback) = perform(backend.as_ref(), cmd) {
                    // receiver gone means the app is shutting down
                    let _ = feedback_tx.send(feedback);
                }
            });
        }
        debug!("request worker stopped");
    }
}

/// Run one request to completion.
pub fn perform(backend: &dyn Backend, cmd: ApiCmd) -> Option<ApiFeedback> {
    let feedback = match cmd {
        ApiCmd::FetchSchemas(kind) => ApiFeedback::Schemas {
            kind,
            result: match kind {
                SchemaKind::Effect => backend.effect_schemas(),
                SchemaKind::Action => backend.action_schemas(),
                SchemaKind::Output => Ok(Registry::builtin_outputs()),
            },
        },
        ApiCmd::FetchConfig => ApiFeedback::Config(backend.config()),
        ApiCmd::SaveConfig(config) => ApiFeedback::Saved(backend.save_config(&config)),
        ApiCmd::FetchTempo => ApiFeedback::Tempo(backend.tempo()),
        ApiCmd::SetTempo(bpm) => ApiFeedback::TempoSet(backend.set_tempo(bpm)),
        ApiCmd::FetchChains => ApiFeedback::Chains(backend.chains()),
        ApiCmd::FetchEvents => ApiFeedback::Events(backend.events()),
        ApiCmd::Trigger(event) => {
            let result = backend.trigger(&event);
            ApiFeedback::Triggered { event, result }
        }
        ApiCmd::Shutdown => return None,
    };
    Some(feedback)
}
