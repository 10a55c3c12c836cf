//! Built-in tool implementations for taoloop.
//!
//! Three small local capabilities the agent can call by name:
//! arithmetic, a book catalog lookup, and a weather stub.

pub mod book_lookup;
pub mod calculator;
pub mod weather_lookup;

use taoloop_core::tool::ToolRegistry;

pub use book_lookup::{BookCatalog, BookInfo, BookLookupTool};
pub use calculator::{CalculatorInput, CalculatorOutput, CalculatorTool, Operation};
pub use weather_lookup::WeatherLookupTool;

/// Create a registry with every built-in tool.
pub fn default_registry() -> ToolRegistry {
    ToolRegistry::new()
        .with(calculator::CalculatorTool)
        .with(book_lookup::BookLookupTool::default())
        .with(weather_lookup::WeatherLookupTool)
}
