//! Nutri Engine - Pure compute engine for dietitian client health metrics
//!
//! The engine turns raw body measurements and a client profile into derived
//! values through four independent, stateless components:
//!
//! - **MetricCalculator**: BMI, basal and total energy expenditure, calorie target
//! - **MacroAllocator**: protein/carbs/fat split kept at exactly 100% under edits
//! - **RangeClassifier**: dynamic ideal ranges and low/ideal/high classification
//! - **TrendAnalyzer**: change between the two most recent measurements
//!
//! No component performs I/O or holds mutable state; the same inputs always
//! produce the same outputs.

pub mod calculator;
pub mod config;
pub mod encoder;
pub mod error;
pub mod macros;
pub mod metric;
pub mod normalizer;
pub mod pipeline;
pub mod ranges;
pub mod trend;
pub mod types;

#[cfg(feature = "cli")]
pub mod logging;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calculator::{bmi_category, MetricCalculator};
pub use config::EngineConfig;
pub use error::{EngineError, Result, ValidationError};
pub use macros::MacroAllocator;
pub use metric::{Metric, MetricKind};
pub use normalizer::{Normalizer, RawMeasurement, RawProfile};
pub use pipeline::{assess_json, HealthEngine};
pub use ranges::{classify, RangeClassifier};
pub use trend::TrendAnalyzer;
pub use types::{
    ActivityLevel, Classification, Gender, Goal, HealthMetrics, IdealRange, Macro, MacroSplit,
    Measurement, PersonProfile, TrendResult,
};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "nutri-engine";
