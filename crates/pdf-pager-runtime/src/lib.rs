//! Event-driven page pipeline for a paged PDF viewer.
//!
//! The view feeds [`Event`]s into a [`Pipeline`], which turns them into
//! asynchronous work against a [`DocumentRenderer`], folds the resulting
//! [`Update`]s into a single observable [`State`] and hands one-shot
//! [`Effect`]s back to the view.

mod bitmap;
mod config;
mod messages;
mod page;
mod pipeline;
mod reducer;
mod renderer;

pub use bitmap::{Bitmap, composite_onto_white, scaled_height};
pub use config::{ConfigError, PDF_MIME_TYPE, PagerConfig};
pub use messages::{Effect, Event, Update};
pub use page::{Page, State};
pub use pipeline::{Pipeline, PipelineError};
pub use reducer::{Fold, reduce};
pub use renderer::{DocumentRenderer, DocumentSource, RenderError, Result};
