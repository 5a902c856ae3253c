//! JSON rendering for outline results.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::OutlineResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline result to JSON.
pub fn to_json(result: &OutlineResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write an outline result as JSON, followed by a newline.
pub fn write_json<W: Write>(result: &OutlineResult, format: JsonFormat, mut writer: W) -> Result<()> {
    let json = to_json(result, format)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}
