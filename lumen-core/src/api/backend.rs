use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::live::ChainView;
use crate::model::Config;
use crate::schema::Registry;

pub const EFFECT_SCHEMA_PATH: &str = "/api/effects/schema";
pub const ACTION_SCHEMA_PATH: &str = "/api/actions/schema";
pub const CONFIG_PATH: &str = "/api/config";
pub const BPM_PATH: &str = "/api/bpm";
pub const CHAINS_PATH: &str = "/api/chains";
pub const EVENTS_PATH: &str = "/api/events";
pub const TRIGGER_PATH: &str = "/api/trigger";

/// Blocking calls against the pipeline. Implementations must be callable
/// from several request threads at once.
pub trait Backend: Send + Sync {
    fn effect_schemas(&self) -> Result<Registry, ApiError>;
    fn action_schemas(&self) -> Result<Registry, ApiError>;
    fn config(&self) -> Result<Config, ApiError>;
    /// Replace the stored config wholesale. Returns the backend's message.
    fn save_config(&self, config: &Config) -> Result<String, ApiError>;
    fn tempo(&self) -> Result<f64, ApiError>;
    /// Returns the tempo the backend settled on.
    fn set_tempo(&self, bpm: f64) -> Result<f64, ApiError>;
    fn chains(&self) -> Result<Vec<ChainView>, ApiError>;
    fn events(&self) -> Result<Vec<String>, ApiError>;
    fn trigger(&self, event: &str) -> Result<Value, ApiError>;
}

#[derive(Serialize, Deserialize)]
struct TempoBody {
    bpm: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerBody<'a> {
    event_name: &'a str,
}

#[derive(Deserialize)]
struct SaveResponse {
    message: String,
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::fetch(base_url, e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().map_err(|e| ApiError::fetch(path, e))?;
        let status = response.status();
        let body = response.text().map_err(|e| ApiError::fetch(path, e))?;
        if !status.is_success() {
            return Err(ApiError::fetch(path, format!("{}: {}", status, body.trim())));
        }
        Ok(body)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.get_text(path)?;
        serde_json::from_str(&body).map_err(|e| ApiError::fetch(path, e))
    }

    /// POST a JSON body. Failures come back as plain reasons so each caller
    /// can wrap them in its own error kind.
    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String, String> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("{}: {}", status, text.trim()));
        }
        Ok(text)
    }
}

impl Backend for HttpBackend {
    fn effect_schemas(&self) -> Result<Registry, ApiError> {
        let body = self.get_text(EFFECT_SCHEMA_PATH)?;
        Registry::from_effect_json(&body).map_err(|e| ApiError::fetch(EFFECT_SCHEMA_PATH, e))
    }

    fn action_schemas(&self) -> Result<Registry, ApiError> {
        let body = self.get_text(ACTION_SCHEMA_PATH)?;
        Registry::from_action_json(&body).map_err(|e| ApiError::fetch(ACTION_SCHEMA_PATH, e))
    }

    fn config(&self) -> Result<Config, ApiError> {
        self.get_json(CONFIG_PATH)
    }

    fn save_config(&self, config: &Config) -> Result<String, ApiError> {
        let text = self.post_json(CONFIG_PATH, config).map_err(ApiError::Save)?;
        // some builds answer with plain text
        Ok(serde_json::from_str::<SaveResponse>(&text)
            .map(|r| r.message)
            .unwrap_or_else(|_| text.trim().to_string()))
    }

    fn tempo(&self) -> Result<f64, ApiError> {
        let body: TempoBody = self.get_json(BPM_PATH)?;
        Ok(body.bpm)
    }

    fn set_tempo(&self, bpm: f64) -> Result<f64, ApiError> {
        let text = self.post_json(BPM_PATH, &TempoBody { bpm }).map_err(ApiError::Tempo)?;
        let body: TempoBody = serde_json::from_str(&text).map_err(|e| ApiError::Tempo(e.to_string()))?;
        Ok(body.bpm)
    }

    fn chains(&self) -> Result<Vec<ChainView>, ApiError> {
        let chains: Option<Vec<ChainView>> = self.get_json(CHAINS_PATH)?;
        Ok(chains.unwrap_or_default())
    }

    fn events(&self) -> Result<Vec<String>, ApiError> {
        let events: Option<Vec<String>> = self.get_json(EVENTS_PATH)?;
        Ok(events.unwrap_or_default())
    }

    fn trigger(&self, event: &str) -> Result<Value, ApiError> {
        let text = self
            .post_json(TRIGGER_PATH, &TriggerBody { event_name: event })
            .map_err(|reason| ApiError::Trigger { event: event.to_string(), reason })?;
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let backend = HttpBackend::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080");
        assert_eq!(backend.url(CONFIG_PATH), "http://localhost:8080/api/config");
    }

    #[test]
    fn trigger_body_uses_camel_case() {
        let body = serde_json::to_value(TriggerBody { event_name: "drop" }).unwrap();
        assert_eq!(body, serde_json::json!({"eventName": "drop"}));
    }

    #[test]
    fn unreachable_backend_is_a_fetch_error() {
        // nothing listens on the discard port
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        assert!(matches!(backend.tempo(), Err(ApiError::Fetch { .. })));
        assert!(matches!(backend.set_tempo(120.0), Err(ApiError::Tempo(_))));
    }
}
