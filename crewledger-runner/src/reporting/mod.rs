//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod format;
pub mod markdown;
pub mod text;

pub use artifacts::{ArtifactManager, ArtifactPaths, PlanManifest};
pub use format::format_minor;
pub use markdown::MarkdownReportGenerator;
