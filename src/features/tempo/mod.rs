//! Tempo-aware event post-processing
//!
//! - Line-fit refinement of an event set onto a near-uniform beat grid
//! - Grid utilities (uniform subdivision, time-based de-duplication)

pub mod grid;
pub mod refine;

pub use grid::{dedup_events_by_time, subdivide_events};
pub use refine::{fit_tempo_line, refine_events_with_tempo, TempoFit};
