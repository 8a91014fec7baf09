//! Streaming output helpers (made by FontLab https://www.fontlab.com/)

use std::io::Write;

use anyhow::Result;

use crate::entry::FontEntry;

/// Write entries as a prettified JSON array.
pub fn write_json_pretty<'a>(
    entries: impl IntoIterator<Item = &'a FontEntry>,
    mut w: impl Write,
) -> Result<()> {
    let entries: Vec<&FontEntry> = entries.into_iter().collect();
    let json = serde_json::to_string_pretty(&entries)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write entries as newline-delimited JSON (NDJSON).
pub fn write_ndjson<'a>(
    entries: impl IntoIterator<Item = &'a FontEntry>,
    mut w: impl Write,
) -> Result<()> {
    for entry in entries {
        let line = serde_json::to_string(entry)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
