//! Weather tool: a fixed stub.
//!
//! Every location gets the same answer; there is no weather service behind
//! it. Enough to drive the loop end-to-end without network access.

use async_trait::async_trait;
use taoloop_core::error::ToolError;
use taoloop_core::tool::{Tool, ToolOutput};

pub struct WeatherLookupTool;

/// The stub's answer for `location`.
pub fn weather_report(location: &str) -> String {
    format!("The weather in {location} is sunny with low temperatures.")
}

#[async_trait]
impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather in a given location."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city name or location to look up weather for"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let location = arguments["location"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'location' argument".into()))?;

        Ok(ToolOutput::text(weather_report(location)))
    }
}
