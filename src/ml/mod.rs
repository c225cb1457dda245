//! Hand-off to a downstream beat classifier
//!
//! No model is trained or run here. The crate exports per-frame feature rows
//! (with optional temporal context), turns a classifier's per-frame
//! probabilities back into events, merges them with the rule-based events,
//! and scores predictions against frame labels.

pub mod context;
pub mod hybrid;
pub mod metrics;

pub use context::{context_features, feature_matrix, FeatureMatrix, FEATURE_NAMES};
pub use hybrid::{combine_rule_and_ml_events, probs_to_events, threshold_segments, HybridParams};
pub use metrics::{event_level_metrics, EventMetrics};
