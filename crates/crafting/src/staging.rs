//! Per-tick input staging.
//!
//! Producers write the input they observe at each position before the
//! scheduler ticks; the scheduler consumes entries as crafts advance and
//! clears whatever is left at the end of the tick.

use crate::context::CraftInput;
use interactio_core::BlockPos;
use std::collections::BTreeMap;

/// Position → input observed this tick.
#[derive(Debug, Clone, Default)]
pub struct InputStagingBuffer {
    inputs: BTreeMap<BlockPos, CraftInput>,
}

impl InputStagingBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `input` at `pos`, replacing anything staged there this tick.
    pub fn write(&mut self, pos: BlockPos, input: CraftInput) {
        self.inputs.insert(pos, input);
    }

    /// Input staged at `pos`.
    pub fn read(&self, pos: BlockPos) -> Option<&CraftInput> {
        self.inputs.get(&pos)
    }

    /// Input staged at `pos`, staging `default()` first if nothing is there.
    ///
    /// Lets producers that discover inputs piecemeal (one item entity at a
    /// time) accumulate into a single entry.
    pub fn read_or_insert_with<F>(&mut self, pos: BlockPos, default: F) -> &mut CraftInput
    where
        F: FnOnce() -> CraftInput,
    {
        self.inputs.entry(pos).or_insert_with(default)
    }

    /// Drop the input staged at `pos`.
    pub fn clear_at(&mut self, pos: BlockPos) -> Option<CraftInput> {
        self.inputs.remove(&pos)
    }

    /// Drop every staged input.
    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    /// Take every staged input, leaving the buffer empty.
    pub fn take_all(&mut self) -> BTreeMap<BlockPos, CraftInput> {
        std::mem::take(&mut self.inputs)
    }

    /// Number of staged positions.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
