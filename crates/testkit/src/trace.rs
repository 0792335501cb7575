//! Tick-trace harness for deterministic multi-tick tests.
//!
//! A trace steps a tiny simulation for a fixed number of ticks and captures
//! a snapshot after each step, so tests can assert on the whole timeline
//! instead of only the final state.

use interactio_core::SimTick;
use serde::Serialize;

/// Single snapshot captured at a given tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceFrame<S> {
    /// Tick that was just stepped.
    pub tick: SimTick,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Step `state` once per tick for `ticks` ticks starting at `start`.
///
/// `step` runs with the tick being simulated; `snapshot` runs right after
/// it with the same tick. Returns one frame per step.
pub fn run_trace<State, Snapshot, StepFn, SnapFn>(
    start: SimTick,
    ticks: u64,
    state: &mut State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Vec<TraceFrame<Snapshot>>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(ticks as usize);
    let mut tick = start;
    for _ in 0..ticks {
        step(tick, state);
        frames.push(TraceFrame {
            tick,
            snapshot: snapshot(tick, state),
        });
        tick = tick.advance(1);
    }
    frames
}
