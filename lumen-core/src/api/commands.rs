//! Request and result messages exchanged with the request worker.

use serde_json::Value;

use crate::error::ApiError;
use crate::live::ChainView;
use crate::model::Config;
use crate::schema::{Registry, SchemaKind};

/// Requests sent from the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCmd {
    // ── Editor ────────────────────────────────────────────────────
    FetchSchemas(SchemaKind),
    FetchConfig,
    SaveConfig(Box<Config>),

    // ── Live ──────────────────────────────────────────────────────
    FetchTempo,
    SetTempo(f64),
    FetchChains,
    FetchEvents,
    Trigger(String),

    Shutdown,
}

/// Results sent back to the UI thread, one per request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFeedback {
    // ── Editor ────────────────────────────────────────────────────
    Schemas {
        kind: SchemaKind,
        result: Result<Registry, ApiError>,
    },
    Config(Result<Config, ApiError>),
    Saved(Result<String, ApiError>),

    // ── Live ──────────────────────────────────────────────────────
    Tempo(Result<f64, ApiError>),
    TempoSet(Result<f64, ApiError>),
    Chains(Result<Vec<ChainView>, ApiError>),
    Events(Result<Vec<String>, ApiError>),
    Triggered {
        event: String,
        result: Result<Value, ApiError>,
    },
}
