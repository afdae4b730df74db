//! Report renderer
//!
//! One `<name>: <amount>, <unit>` line per aggregated line, newline-terminated,
//! no header and no summary. Input is expected to be sorted already.

use super::AggregatedLine;

/// Download filename of the rendered report
pub const REPORT_FILENAME: &str = "cart.txt";

pub const REPORT_CONTENT_TYPE: &str = "text/plain";

pub const REPORT_CONTENT_DISPOSITION: &str = "attachment; filename=\"cart.txt\"";

/// Render the report as UTF-8 bytes
pub fn render(lines: &[AggregatedLine]) -> Vec<u8> {
    let mut out = Vec::with_capacity(lines.len() * 24);
    for line in lines {
        out.extend_from_slice(line.to_string().as_bytes());
        out.push(b'\n');
    }
    out
}
