/// Feature derivation and summaries for the environmental forecast service.
///
/// Everything here is a pure transform over an in-memory snapshot of
/// readings: no I/O, no shared state between calls.
///
/// Submodules:
/// - `align`    : pairs readings with their lag-1 and lag-24 predecessors.
/// - `groupings`: station filters over aligned output.
/// - `stats`    : summary statistics over an aligned dataset.

pub mod align;
pub mod groupings;
pub mod stats;

pub use align::{align, align_with, LagWindows};
pub use stats::summarize;
