//! ApiHandle: main-thread interface to the request worker.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::backend::{Backend, HttpBackend};
use super::commands::{ApiCmd, ApiFeedback};
use super::worker::ApiThread;
use crate::error::ApiError;
use crate::settings::Settings;

pub struct ApiHandle {
    cmd_tx: Sender<ApiCmd>,
    feedback_rx: Receiver<ApiFeedback>,
    join_handle: Option<JoinHandle<()>>,
}

impl ApiHandle {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let backend = HttpBackend::new(&settings.base_url, settings.request_timeout())?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (feedback_tx, feedback_rx) = mpsc::channel();

        let join_handle = thread::spawn(move || {
            ApiThread::new(backend, cmd_rx, feedback_tx).run();
        });

        Self {
            cmd_tx,
            feedback_rx,
            join_handle: Some(join_handle),
        }
    }

    pub fn send_cmd(&self, cmd: ApiCmd) -> Result<(), ApiError> {
        self.cmd_tx.send(cmd).map_err(|_| ApiError::Disconnected)
    }

    /// Everything that completed since the last frame.
    pub fn drain_feedback(&mut self) -> Vec<ApiFeedback> {
        let mut out = Vec::new();
        while let Ok(msg) = self.feedback_rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Block for the next result. Used by tests and headless callers.
    pub fn wait_feedback(&self, timeout: Duration) -> Option<ApiFeedback> {
        self.feedback_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for ApiHandle {
    fn drop(&mut self) {
        let _ = self.send_cmd(ApiCmd::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
