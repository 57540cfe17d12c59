// crates/pgsolve-core/src/io.rs

//! Serialization helpers for [`Solution`] artifacts.
//!
//! JSON and CBOR read/write with extension-based auto-detection, plus the
//! semicolon-separated `vertex;winner;strategy` CSV dump consumers of the
//! original tooling expect. Unknown/missing extensions are rejected for
//! reads and default to JSON for writes.

use crate::solution::Solution;
use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Read a [`Solution`] from **JSON**.
pub fn read_solution_json<P: AsRef<Path>>(path: P) -> Result<Solution> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = BufReader::new(f);
    serde_json::from_reader(rdr).with_context(|| "deserialize JSON solution")
}

/// Write a [`Solution`] to **JSON** (pretty).
pub fn write_solution_json<P: AsRef<Path>>(path: P, s: &Solution) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = BufWriter::new(f);
    serde_json::to_writer_pretty(w, s).with_context(|| "serialize JSON solution")?;
    Ok(())
}

/// Read a [`Solution`] from **CBOR**.
pub fn read_solution_cbor<P: AsRef<Path>>(path: P) -> Result<Solution> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR solution")
}

/// Write a [`Solution`] to **CBOR**.
pub fn write_solution_cbor<P: AsRef<Path>>(path: P, s: &Solution) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(s, &mut w).with_context(|| "serialize CBOR solution")?;
    Ok(())
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_solution_auto<P: AsRef<Path>>(path: P) -> Result<Solution> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_solution_json(path),
        Some("cbor") => read_solution_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported solution extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_solution_auto<P: AsRef<Path>>(path: P, s: &Solution) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_solution_cbor(path, s),
        _ => write_solution_json(path, s),
    }
}

/// Write the `vertex;winner;strategy` CSV dump.
///
/// Undecided vertices print winner `-1`; absent strategies print `-1`.
pub fn write_solution_csv<P: AsRef<Path>>(path: P, s: &Solution) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    writeln!(w, "vertex;winner;strategy")?;
    for v in 0..s.len() {
        let winner = s.winners[v].map_or(-1i64, |p| p.index() as i64);
        let strat = s.strategies[v].map_or(-1i64, i64::from);
        writeln!(w, "{v};{winner};{strat}")?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineKind;
    use crate::solution::SolverSink;
    use crate::types::Player;

    fn sample() -> Solution {
        let mut s = Solution::new(EngineKind::Spm, 2);
        s.resolve(0, Player::Even, Some(0));
        s.resolve(1, Player::Odd, None);
        s
    }

    #[test]
    fn auto_roundtrip_json_and_cbor() {
        let dir = std::env::temp_dir().join("pgsolve-core-io-test");
        for name in ["s.json", "s.cbor"] {
            let p = dir.join(name);
            write_solution_auto(&p, &sample()).expect("write");
            let back = read_solution_auto(&p).expect("read");
            assert_eq!(back.winners, sample().winners);
            assert_eq!(back.strategies, sample().strategies);
        }
    }

    #[test]
    fn csv_shape() {
        let p = std::env::temp_dir().join("pgsolve-core-io-test/s.csv");
        write_solution_csv(&p, &sample()).expect("write");
        let text = std::fs::read_to_string(&p).expect("read back");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("vertex;winner;strategy"));
        assert_eq!(lines.next(), Some("0;0;0"));
        assert_eq!(lines.next(), Some("1;1;-1"));
    }
}
