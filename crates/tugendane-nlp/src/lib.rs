//! Intent classification and entity extraction for Tugendane.
//!
//! Everything here is a pure function of the input text and fixed tables:
//! deterministic, side-effect free, and safe on arbitrary input.

pub mod entity;
pub mod intent;
pub mod language;

pub use entity::{EntityExtractor, EntityMap};
pub use intent::IntentClassifier;
pub use language::{detect_language, has_kinyarwanda_evidence};
