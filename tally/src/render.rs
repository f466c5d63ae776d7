//! Response rendering
//!
//! Every command produces one `Response`: the active mode, the text of
//! its display elements after the command ran, optional structured data
//! and an optional error.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tally_core::TallyError;
use tally_plugin::MemorySurface;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub display: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "JsonValue::is_null")]
    pub data: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TallyError>,
}

impl Response {
    /// Text of one display element, if present
    pub fn element(&self, id: &str) -> Option<&str> {
        self.display.get(id).map(|s| s.as_str())
    }
}

/// Builds responses from command outcomes
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        mode: Option<&str>,
        surface: Option<&MemorySurface>,
        outcome: Result<JsonValue, TallyError>,
    ) -> Response {
        let display = surface.map(|s| s.snapshot()).unwrap_or_default();
        let (ok, data, error) = match outcome {
            Ok(data) => (true, data, None),
            Err(e) => (false, JsonValue::Null, Some(e)),
        };
        Response {
            ok,
            mode: mode.map(|m| m.to_string()),
            display,
            data,
            error,
        }
    }

    /// One JSON document per line, as the stdio driver writes them
    pub fn to_json_line(&self, response: &Response) -> String {
        match serde_json::to_string(response) {
            Ok(json) => json,
            Err(e) => {
                let fallback = TallyError::internal(format!("Failed to serialize response: {}", e));
                serde_json::json!({ "ok": false, "error": fallback }).to_string()
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tally_plugin::Surface;

    #[test]
    fn test_success_response() {
        let mut surface = MemorySurface::with_elements(["current-operand"]);
        surface.set_text("current-operand", "42");
        let response = Renderer::new().render(Some("standard"), Some(&surface), Ok(json!({"value": 42})));
        assert!(response.ok);
        assert_eq!(response.element("current-operand"), Some("42"));

        let line = Renderer::new().to_json_line(&response);
        assert!(line.contains("\"mode\":\"standard\""));
        assert!(!line.contains("\"error\""));
    }

    #[test]
    fn test_error_response_omits_empty_fields() {
        let response = Renderer::new().render(None, None, Err(TallyError::unknown_command("zap")));
        assert!(!response.ok);
        let line = Renderer::new().to_json_line(&response);
        let value: JsonValue = serde_json::from_str(&line).unwrap();
        assert_eq!(value["error"]["code"], "UNKNOWN_COMMAND");
        assert!(value.get("display").is_none());
        assert!(value.get("data").is_none());
        assert!(value.get("mode").is_none());
    }
}
