#![warn(missing_docs)]
//! Deterministic testing surfaces: an in-memory world, tick traces and a
//! JSONL craft event stream.

mod memory_world;
mod trace;

use anyhow::{Context, Result};
use interactio_core::{BlockPos, Identifier, SimTick, WorldId};
use interactio_crafting::{CraftOutcome, CraftOutput, ItemStack};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use memory_world::*;
pub use trace::*;

/// Parse an identifier literal. Panics on malformed input; fixtures only.
pub fn id(raw: &str) -> Identifier {
    match Identifier::parse(raw) {
        Ok(id) => id,
        Err(err) => panic!("bad fixture identifier: {err}"),
    }
}

/// A stack of `count` items of type `raw`.
pub fn stack(raw: &str, count: u32) -> ItemStack {
    ItemStack::new(id(raw), count)
}

/// One craft event captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the craft committed.
    pub tick: SimTick,
    /// World the craft happened in.
    pub world: WorldId,
    /// What triggered it (`tick`, `explosion`, `lightning`, ...).
    pub kind: &'a str,
    /// Recipe that fired.
    pub recipe: &'a Identifier,
    /// Crafting position.
    pub pos: BlockPos,
    /// Items consumed.
    pub consumed: &'a [ItemStack],
    /// Outputs produced.
    pub outputs: &'a [CraftOutput],
}

impl<'a> EventRecord<'a> {
    /// Record for a committed craft.
    pub fn from_outcome(tick: SimTick, world: WorldId, kind: &'a str, outcome: &'a CraftOutcome) -> Self {
        Self {
            tick,
            world,
            kind,
            recipe: &outcome.recipe,
            pos: outcome.pos,
            consumed: &outcome.consumed,
            outputs: &outcome.outputs,
        }
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
    written: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        Ok(Self { file, written: 0 })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of events written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn jsonl_sink_writes_one_line_per_craft() {
        let path = std::env::temp_dir().join(format!(
            "craft-events-{}.jsonl",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let outcome = CraftOutcome {
            recipe: id("gravel_wash"),
            pos: BlockPos::new(1, 2, 3),
            consumed: vec![stack("gravel", 2)],
            outputs: vec![CraftOutput::Item(stack("sand", 1))],
        };
        let mut sink = JsonlSink::create(&path).expect("sink create");
        let record = EventRecord::from_outcome(SimTick(4), WorldId::OVERWORLD, "tick", &outcome);
        sink.write(&record).expect("write succeeds");
        sink.write(&record).expect("write succeeds");
        assert_eq!(sink.written(), 2);

        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("minecraft:gravel_wash"));
        assert!(lines[0].contains("\"kind\":\"tick\""));
        let _ = fs::remove_file(path);
    }
}
