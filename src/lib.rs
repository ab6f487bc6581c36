//! # thumbkit
//!
//! Post-save image resizing for uploaded attachments. Given a size option
//! from configuration (an integer, a pair, or a string like `"c75x75"`) and
//! the uploaded bytes, thumbkit resolves the target dimensions and resize
//! mode, drives an injected image codec to produce the resized output,
//! writes it to temporary storage, and updates the owning record's
//! dimension fields.
//!
//! # Architecture
//!
//! ```text
//! RawSize ──parse──▶ SizeSpec ──resolve──▶ (target, mode)
//!                                              │
//!   bytes ──decode guard──▶ image ──codec──▶ resized ──▶ temp store
//!                                              │
//!                                       record width/height,
//!                                       after_resize hook
//! ```
//!
//! Resolution is pure math; all pixel work lives behind the [`ImageCodec`]
//! trait so the pipeline logic is testable with a recording mock and usable
//! with any codec implementation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`size_spec`] | Config value → tagged [`SizeSpec`], validated once per request |
//! | [`geometry`] | `WxH` bounding-box grammar with fit modifiers (`>`, `<`, `!`, `^`, `%`) |
//! | [`resolve`] | Pure target/mode resolution and proportional scaling |
//! | [`codec`] | [`ImageCodec`] capability trait, formats, quality, background |
//! | [`rust_codec`] | Production codec on the `image` crate |
//! | [`record`] | [`AttachmentRecord`] capability for resize-aware records |
//! | [`temp_store`] | Temp output storage and the newest-first handle list |
//! | [`pipeline`] | Ordered named-stage pipeline and the resize stage |
//!
//! # Design Decisions
//!
//! ## Tagged Specs Over Duck Typing
//!
//! The classic attachment processors re-inspected the size option's runtime
//! type (integer? array? string starting with `c`?) on every resize. Here the
//! option is parsed once into a [`SizeSpec`] variant; malformed specs fail
//! fast with [`SpecError::InvalidSizeSpec`] instead of surfacing mid-resize.
//!
//! ## Injected Codec Capability
//!
//! There is no global "is the image library available" probe. The pipeline is
//! generic over [`ImageCodec`]; an environment without image support simply
//! never constructs one.
//!
//! ## Explicit Stage Pipeline
//!
//! Instead of rewriting a base `process` method at runtime, processing is an
//! ordered list of named [`ProcessStage`]s (`[base_process, resize]`). A
//! stage can halt the pipeline, which is how the base save step vetoes
//! resizing.
//!
//! ## Preserved Scale-Fit Quirk
//!
//! For `"fWxH"` specs the proportional bound is chosen by whichever *source*
//! axis is larger, even though the canvas axes may not match. That coupling
//! is kept bug-for-bug compatible with the processor this replaces; see
//! [`resolve::resolve`].

pub mod codec;
pub mod geometry;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod rust_codec;
pub mod size_spec;
pub mod temp_store;

pub use codec::{Background, CodecError, Format, ImageCodec, Quality};
pub use pipeline::{
    FnStage, Pipeline, ProcessContext, ProcessError, ProcessStage, ResizeOptions, ResizeStage,
    StageOutcome, decode_guarded, resize_attachment,
};
pub use record::AttachmentRecord;
pub use resolve::{Dimensions, ResizeMode, ResolvedTarget, Scaled, proportional_scale, resolve};
pub use rust_codec::RustCodec;
pub use size_spec::{RawSize, SizeSpec, SpecError, parse_spec};
pub use temp_store::{TempDirStore, TempFileStore, TempOutputs};
