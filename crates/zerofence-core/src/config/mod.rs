//! Configuration loading for the enforcement engine.

pub mod settings;

pub use settings::{AuditSettings, AuthSettings, SegmentationSettings, ZerofenceConfig};
