//! Retoque Core - interactive image editing engine
//!
//! This crate holds everything behind the editor UI: the viewport model,
//! the editing tools, linear undo history and the export pipeline. Hosts
//! drive it through [`EditorSession`]; the wasm crate wraps the same API for
//! the browser.

pub mod adjustments;
pub mod buffer;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod export;
pub mod filters;
pub mod history;
pub mod luminance;
pub mod session;
pub mod tools;
pub mod transform;
pub mod viewport;

pub use adjustments::ToneAdjustments;
pub use buffer::{ImageBuffer, NaturalDimensions};
pub use config::{DeviceClass, DeviceHints, DeviceProfile, EditorConfig};
pub use encode::ExportFormat;
pub use error::{EditError, Result};
pub use export::{suggested_file_name, ExportRequest, ExportResult};
pub use filters::PresetFilter;
pub use history::{HistoryManager, Snapshot};
pub use session::{CommitJob, CommitOutcome, CommitResult, EditorSession, SourceImage};
pub use tools::{ToolKind, ToolPhase, ToolPreview, ToolUpdate, TransformAction};
pub use transform::{CropRegion, FlipAxis, PixelRect, Rotation};
pub use viewport::{ContainerSize, GestureMode, TouchPoint, ViewportController, ViewportState};
