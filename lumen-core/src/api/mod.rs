//! Client side of the pipeline's REST surface.
//!
//! `Backend` is the blocking request interface; `ApiHandle` runs it off the
//! UI thread and hands results back as `ApiFeedback` each frame.

mod backend;
mod commands;
mod handle;
mod worker;

pub use backend::{
    Backend, HttpBackend, ACTION_SCHEMA_PATH, BPM_PATH, CHAINS_PATH, CONFIG_PATH, EFFECT_SCHEMA_PATH,
    EVENTS_PATH, TRIGGER_PATH,
};
pub use commands::{ApiCmd, ApiFeedback};
pub use handle::ApiHandle;
pub use worker::perform;
