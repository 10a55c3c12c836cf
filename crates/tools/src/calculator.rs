//! Calculator tool: one binary arithmetic operation on two numbers.
//!
//! Input is `{ "operation": "add" | "subtract" | "multiply" | "divide",
//! "a": number, "b": number }`. Output is the JSON object
//! `{ "result": n, "explanation": "a operation b = n" }`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taoloop_core::error::ToolError;
use taoloop_core::tool::{Tool, ToolOutput};
use tracing::debug;

/// Supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated calculator arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculatorInput {
    pub operation: Operation,
    pub a: f64,
    pub b: f64,
}

/// The calculator's result.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorOutput {
    pub result: f64,
    pub explanation: String,
}

impl CalculatorOutput {
    /// `{"result": ..., "explanation": ...}` with integral results rendered without a fraction.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "result": number_value(self.result),
            "explanation": self.explanation,
        })
    }
}

/// Apply `input.operation` to `a` and `b`.
pub fn calculate(input: &CalculatorInput) -> Result<CalculatorOutput, ToolError> {
    let CalculatorInput { operation, a, b } = *input;

    let result = match operation {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide => {
            if b == 0.0 {
                return Err(ToolError::DivisionByZero);
            }
            a / b
        }
    };

    if !result.is_finite() {
        return Err(ToolError::ExecutionFailed {
            tool_name: "calculator".into(),
            reason: "result is not a finite number".into(),
        });
    }

    Ok(CalculatorOutput {
        result,
        explanation: format!(
            "{} {} {} = {}",
            format_number(a),
            operation,
            format_number(b),
            format_number(result)
        ),
    })
}

/// Render a number the way a person writes it: `5`, not `5.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn number_value(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        serde_json::json!(value as i64)
    } else {
        serde_json::json!(value)
    }
}

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Perform basic arithmetic (add, subtract, multiply, divide) on two numbers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["add", "subtract", "multiply", "divide"],
                    "description": "The arithmetic operation to apply"
                },
                "a": { "type": "number", "description": "The first operand" },
                "b": { "type": "number", "description": "The second operand" }
            },
            "required": ["operation", "a", "b"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let input: CalculatorInput = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        debug!(operation = %input.operation, a = input.a, b = input.b, "Calculating");

        let output = calculate(&input)?;
        let data = output.to_json();

        Ok(ToolOutput {
            output: data.to_string(),
            data: Some(data),
        })
    }
}
