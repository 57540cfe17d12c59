// crates/pgsolve-games/src/io.rs

//! Reading and writing the pgsolver text format.
//!
//! ```text
//! parity 3;
//! 0 0 0 1 "a";
//! 1 1 1 0,2;
//! 2 2 0 2;
//! 3 1 0 1,3;
//! ```
//!
//! Header value is the highest vertex id. Each record is
//! `id priority owner successors [label];` with owner `0` (Even) or `1`
//! (Odd), successors comma-separated, and an optional quoted label.
//! Records may appear in any id order; every id in `[0, max]` must occur
//! exactly once.

use crate::format::{RawGame, RawVertex};
use anyhow::{anyhow, bail, Context, Result};
use pgsolve_core::{Player, Vertex};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Upper bound on the vertex count a header may declare; records are
/// pre-allocated per id, so absurd headers are rejected before that.
const MAX_VERTICES: usize = 1 << 24;

/// Parse a game from a reader.
pub fn parse_game<R: Read>(reader: R) -> Result<RawGame> {
    let mut lines = BufReader::new(reader).lines();

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line.context("read header line")?;
                let line = line.trim();
                if !line.is_empty() {
                    break line.to_owned();
                }
            }
            None => bail!("empty game file"),
        }
    };
    let max_id: usize = header
        .strip_prefix("parity")
        .ok_or_else(|| anyhow!("expected `parity <max-id>;` header, got {header:?}"))?
        .trim()
        .trim_end_matches(';')
        .trim()
        .parse()
        .context("parse max vertex id in header")?;
    if max_id >= MAX_VERTICES {
        bail!("header declares {} vertices, limit is {MAX_VERTICES}", max_id + 1);
    }

    let n = max_id + 1;
    let mut slots: Vec<Option<RawVertex>> = vec![None; n];

    for (lineno, line) in lines.enumerate() {
        let line = line.with_context(|| format!("read record line {}", lineno + 2))?;
        let line = line.trim().trim_end_matches(';').trim();
        if line.is_empty() {
            continue;
        }
        let (record, name) = split_label(line)
            .with_context(|| format!("record on line {}", lineno + 2))?;
        let mut fields = record.split_whitespace();

        let id: usize = fields
            .next()
            .ok_or_else(|| anyhow!("missing vertex id on line {}", lineno + 2))?
            .parse()
            .with_context(|| format!("parse vertex id on line {}", lineno + 2))?;
        if id > max_id {
            bail!("vertex id {id} exceeds header maximum {max_id}");
        }
        if slots[id].is_some() {
            bail!("vertex {id} defined twice");
        }

        let priority = fields
            .next()
            .ok_or_else(|| anyhow!("missing priority for vertex {id}"))?
            .parse()
            .with_context(|| format!("parse priority of vertex {id}"))?;
        let owner = match fields.next() {
            Some("0") => Player::Even,
            Some("1") => Player::Odd,
            other => bail!("owner of vertex {id} must be 0 or 1, got {other:?}"),
        };
        let succ_field = fields
            .next()
            .ok_or_else(|| anyhow!("missing successors for vertex {id}"))?;
        if fields.next().is_some() {
            bail!("trailing fields after successors of vertex {id}");
        }
        let successors = succ_field
            .split(',')
            .map(|s| {
                s.trim()
                    .parse::<Vertex>()
                    .with_context(|| format!("parse successor {s:?} of vertex {id}"))
            })
            .collect::<Result<Vec<_>>>()?;
        if successors.is_empty() {
            bail!("vertex {id} has no successors");
        }

        slots[id] = Some(RawVertex {
            priority,
            owner,
            successors,
            name,
        });
    }

    let vertices = slots
        .into_iter()
        .enumerate()
        .map(|(id, v)| v.ok_or_else(|| anyhow!("vertex {id} missing from file")))
        .collect::<Result<Vec<_>>>()?;
    Ok(RawGame { vertices })
}

/// Split an optional trailing `"label"` off a record.
fn split_label(line: &str) -> Result<(&str, Option<String>)> {
    match line.find('"') {
        None => Ok((line, None)),
        Some(start) => {
            let rest = &line[start + 1..];
            let end = rest
                .find('"')
                .ok_or_else(|| anyhow!("unterminated label quote"))?;
            if !rest[end + 1..].trim().is_empty() {
                bail!("unexpected content after label");
            }
            Ok((&line[..start], Some(rest[..end].to_owned())))
        }
    }
}

/// Read a game from a pgsolver-format file.
pub fn read_game<P: AsRef<Path>>(path: P) -> Result<RawGame> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    parse_game(f).with_context(|| format!("parse {}", path.display()))
}

/// Write a game in pgsolver format.
pub fn write_game<P: AsRef<Path>>(path: P, game: &RawGame) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);

    writeln!(w, "parity {};", game.len().saturating_sub(1))?;
    for (id, v) in game.vertices.iter().enumerate() {
        let succs = v
            .successors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        match &v.name {
            Some(name) => writeln!(
                w,
                "{id} {} {} {succs} \"{name}\";",
                v.priority,
                v.owner.index()
            )?,
            None => writeln!(w, "{id} {} {} {succs};", v.priority, v.owner.index())?,
        }
    }
    w.flush()?;
    Ok(())
}
