//! Line-delimited JSON reading and writing
//!
//! All three input streams and all three output streams are JSONL: one
//! record per line. Reading is lenient — a line that fails to decode is
//! skipped and counted, so one bad record cannot sink a whole feed.
//! Writing is atomic: records go to a sibling temp file which is renamed
//! into place, so a consumer never observes a half-written output.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of reading one JSONL file.
pub struct ReadOutcome<T> {
    pub records: Vec<T>,
    /// Lines skipped because they failed to decode.
    pub malformed_lines: u64,
}

/// Read every record from a JSONL file, skipping and counting lines that
/// do not decode. Blank lines are ignored without being counted.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<ReadOutcome<T>> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("Cannot open {}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut malformed_lines = 0u64;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                malformed_lines += 1;
                debug!(
                    "Skipping malformed line {} in {}: {}",
                    line_no + 1,
                    path.display(),
                    e
                );
            }
        }
    }

    if malformed_lines > 0 {
        warn!(
            "{}: skipped {} malformed line(s)",
            path.display(),
            malformed_lines
        );
    }

    Ok(ReadOutcome {
        records,
        malformed_lines,
    })
}

/// Write records to a JSONL file atomically (temp file + rename).
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp_path = temp_sibling(path);

    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
