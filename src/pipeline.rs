//! Post-save processing pipeline.
//!
//! An ordered list of named stages replaces the runtime method-chaining the
//! classic attachment plugins used: the caller's base save step and the
//! [`ResizeStage`] run in an explicit, inspectable order, and a stage may
//! halt the pipeline (the base process returning falsy short-circuits
//! everything after it).
//!
//! The resize stage itself:
//!
//! 1. decodes the attachment bytes behind a guard — decode failure is logged
//!    and skipped, never raised;
//! 2. resolves the configured [`SizeSpec`] against the decoded dimensions;
//! 3. dispatches to the codec by resize mode;
//! 4. strips metadata unless `keep_profile` is set;
//! 5. encodes and writes to temp storage, newest output first;
//! 6. writes the final dimensions back to the record and emits the
//!    `after_resize` notification.

use crate::codec::{Background, CodecError, Format, ImageCodec, Quality};
use crate::record::AttachmentRecord;
use crate::resolve::{ResizeMode, resolve};
use crate::size_spec::{SizeSpec, SpecError};
use crate::temp_store::{TempFileStore, TempOutputs};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("size spec error: {0}")]
    Spec(#[from] SpecError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Options for one resize operation.
#[derive(Debug, Clone)]
pub struct ResizeOptions {
    pub size: SizeSpec,
    /// Keep embedded metadata/profiles instead of stripping them.
    pub keep_profile: bool,
    /// Canvas fill for scale-and-pad output.
    pub background: Background,
    pub quality: Quality,
}

impl ResizeOptions {
    pub fn new(size: SizeSpec) -> Self {
        Self {
            size,
            keep_profile: false,
            background: Background::default(),
            quality: Quality::default(),
        }
    }
}

/// Everything a stage may touch during one pipeline run.
pub struct ProcessContext<'a, C: ImageCodec, R, S: TempFileStore> {
    pub codec: &'a C,
    pub record: &'a mut R,
    pub store: &'a mut S,
    pub bytes: &'a [u8],
    pub options: &'a ResizeOptions,
    /// Temp handles written so far, newest first.
    pub outputs: TempOutputs<S::Handle>,
}

impl<'a, C: ImageCodec, R, S: TempFileStore> ProcessContext<'a, C, R, S> {
    pub fn new(
        codec: &'a C,
        record: &'a mut R,
        store: &'a mut S,
        bytes: &'a [u8],
        options: &'a ResizeOptions,
    ) -> Self {
        Self {
            codec,
            record,
            store,
            bytes,
            options,
            outputs: TempOutputs::new(),
        }
    }
}

/// Whether the pipeline proceeds past a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Continue,
    Halt,
}

/// A named step in the processing pipeline.
pub trait ProcessStage<C: ImageCodec, R, S: TempFileStore> {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        ctx: &mut ProcessContext<'_, C, R, S>,
    ) -> Result<StageOutcome, ProcessError>;
}

/// Adapter turning a closure into a stage, for the caller's base process step.
pub struct FnStage<F> {
    name: &'static str,
    f: F,
}

impl<F> FnStage<F> {
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<C, R, S, F> ProcessStage<C, R, S> for FnStage<F>
where
    C: ImageCodec,
    S: TempFileStore,
    F: Fn(&mut ProcessContext<'_, C, R, S>) -> Result<StageOutcome, ProcessError>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(
        &self,
        ctx: &mut ProcessContext<'_, C, R, S>,
    ) -> Result<StageOutcome, ProcessError> {
        (self.f)(ctx)
    }
}

/// Ordered pipeline of processing stages.
pub struct Pipeline<C: ImageCodec, R, S: TempFileStore> {
    stages: Vec<Box<dyn ProcessStage<C, R, S>>>,
}

impl<C: ImageCodec, R, S: TempFileStore> Pipeline<C, R, S> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stage(mut self, stage: impl ProcessStage<C, R, S> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run every stage in order. Returns `Ok(false)` when a stage halts.
    pub fn run(&self, ctx: &mut ProcessContext<'_, C, R, S>) -> Result<bool, ProcessError> {
        for stage in &self.stages {
            trace!(stage = stage.name(), "running process stage");
            if stage.run(ctx)? == StageOutcome::Halt {
                debug!(stage = stage.name(), "process pipeline halted");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<C: ImageCodec, R, S: TempFileStore> Default for Pipeline<C, R, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode attachment bytes without letting decode failures escape.
///
/// Corrupt or non-image bytes yield `None`; the underlying error is logged
/// for diagnostics only.
pub fn decode_guarded<C: ImageCodec>(codec: &C, bytes: &[u8]) -> Option<(C::Image, Format)> {
    match codec.decode(bytes) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            debug!(error = %err, "attachment bytes did not decode as an image");
            None
        }
    }
}

/// The resize step of the pipeline.
pub struct ResizeStage;

impl<C, R, S> ProcessStage<C, R, S> for ResizeStage
where
    C: ImageCodec,
    R: AttachmentRecord<C::Image>,
    S: TempFileStore,
{
    fn name(&self) -> &'static str {
        "resize"
    }

    fn run(
        &self,
        ctx: &mut ProcessContext<'_, C, R, S>,
    ) -> Result<StageOutcome, ProcessError> {
        // Not an image: skip the resize entirely, leave the record untouched,
        // and let the rest of the save flow continue.
        let Some((image, source_format)) = decode_guarded(ctx.codec, ctx.bytes) else {
            return Ok(StageOutcome::Continue);
        };

        let current = ctx.codec.dimensions(&image);
        let resolved = resolve(&ctx.options.size, current)?;

        let resized = match resolved.mode {
            ResizeMode::Thumbnail | ResizeMode::Geometry => {
                ctx.codec.resize(&image, resolved.target)?
            }
            ResizeMode::Crop => ctx.codec.crop_to_fill(&image, resolved.target)?,
            ResizeMode::ScaleAndPad { scaled } => {
                let thumb = ctx.codec.resize(&image, scaled.rounded())?;
                ctx.codec
                    .composite_centered(&thumb, resolved.target, ctx.options.background)?
            }
        };

        let resized = if ctx.options.keep_profile {
            resized
        } else {
            ctx.codec.strip(resized)
        };

        // The padded canvas carries a solid background, so it is always
        // written as JPEG; everything else keeps its source format.
        let format = match resolved.mode {
            ResizeMode::ScaleAndPad { .. } => Format::Jpeg,
            _ => source_format,
        };

        let encoded = ctx.codec.encode(&resized, format, ctx.options.quality)?;
        let handle = ctx.store.write(&encoded)?;
        ctx.outputs.record(handle);

        let dims = ctx.codec.dimensions(&resized);
        ctx.record.set_dimensions(dims.width, dims.height);
        ctx.record.after_resize(&resized);

        Ok(StageOutcome::Continue)
    }
}

/// Run a standalone resize (a one-stage pipeline) for an attachment.
///
/// Returns the temp handles written, newest first. An empty result means the
/// bytes did not decode as an image and the record was left untouched.
pub fn resize_attachment<C, R, S>(
    codec: &C,
    record: &mut R,
    store: &mut S,
    bytes: &[u8],
    options: &ResizeOptions,
) -> Result<TempOutputs<S::Handle>, ProcessError>
where
    C: ImageCodec,
    R: AttachmentRecord<C::Image>,
    S: TempFileStore,
{
    let pipeline = Pipeline::new().stage(ResizeStage);
    let mut ctx = ProcessContext::new(codec, record, store, bytes, options);
    pipeline.run(&mut ctx)?;
    Ok(ctx.outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::{MockCodec, RecordedOp};
    use crate::record::tests::TestRecord;
    use crate::resolve::Dimensions;
    use crate::temp_store::tests::MemoryStore;
    use std::sync::Mutex;

    fn run_resize(
        codec: &MockCodec,
        size: SizeSpec,
    ) -> (TestRecord, MemoryStore, TempOutputs<usize>) {
        let mut record = TestRecord::default();
        let mut store = MemoryStore::default();
        let options = ResizeOptions::new(size);
        let outputs =
            resize_attachment(codec, &mut record, &mut store, b"bytes", &options).unwrap();
        (record, store, outputs)
    }

    #[test]
    fn thumbnail_resizes_and_updates_record() {
        let codec = MockCodec::decoding(800, 600);
        let (record, store, outputs) = run_resize(&codec, SizeSpec::Square(75));

        assert_eq!(
            codec.get_operations(),
            vec![
                RecordedOp::Decode,
                RecordedOp::Resize { width: 75, height: 75 },
                RecordedOp::Strip,
                RecordedOp::Encode { format: Format::Png, quality: 90 },
            ]
        );
        assert_eq!(record.width, Some(75));
        assert_eq!(record.height, Some(75));
        assert_eq!(record.after_resize_calls, 1);
        assert_eq!(store.writes.len(), 1);
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn crop_spec_uses_crop_to_fill() {
        let codec = MockCodec::decoding(640, 480);
        let (record, _, _) = run_resize(&codec, SizeSpec::Crop(75, 75));

        assert!(codec
            .get_operations()
            .contains(&RecordedOp::CropToFill { width: 75, height: 75 }));
        assert_eq!((record.width, record.height), (Some(75), Some(75)));
    }

    #[test]
    fn scale_fit_composites_on_canvas_and_forces_jpeg() {
        // Source taller than wide: the bound is max_h (50), so the thumb is
        // 17x50 on a 100x50 canvas.
        let codec = MockCodec::decoding(100, 300).with_format(Format::Png);
        let (record, _, _) = run_resize(&codec, SizeSpec::ScaleFit(100, 50));

        assert_eq!(
            codec.get_operations(),
            vec![
                RecordedOp::Decode,
                RecordedOp::Resize { width: 17, height: 50 },
                RecordedOp::Composite { canvas_width: 100, canvas_height: 50 },
                RecordedOp::Strip,
                RecordedOp::Encode { format: Format::Jpeg, quality: 90 },
            ]
        );
        assert_eq!((record.width, record.height), (Some(100), Some(50)));
    }

    #[test]
    fn geometry_spec_resizes_to_fitted_dimensions() {
        let codec = MockCodec::decoding(400, 200);
        let (record, _, _) = run_resize(&codec, SizeSpec::GeometryFit("100x100>".into()));

        assert!(codec
            .get_operations()
            .contains(&RecordedOp::Resize { width: 100, height: 50 }));
        assert_eq!((record.width, record.height), (Some(100), Some(50)));
    }

    #[test]
    fn keep_profile_skips_strip() {
        let codec = MockCodec::decoding(800, 600);
        let mut record = TestRecord::default();
        let mut store = MemoryStore::default();
        let mut options = ResizeOptions::new(SizeSpec::Square(50));
        options.keep_profile = true;

        resize_attachment(&codec, &mut record, &mut store, b"bytes", &options).unwrap();
        assert!(!codec.get_operations().contains(&RecordedOp::Strip));
    }

    #[test]
    fn decode_failure_skips_resize_without_raising() {
        let codec = MockCodec::failing();
        let (record, store, outputs) = run_resize(&codec, SizeSpec::Square(75));

        assert_eq!(codec.get_operations(), vec![RecordedOp::Decode]);
        assert_eq!(record.width, None);
        assert_eq!(record.height, None);
        assert_eq!(record.after_resize_calls, 0);
        assert!(store.writes.is_empty());
        assert!(outputs.is_empty());
    }

    #[test]
    fn invalid_geometry_surfaces_spec_error() {
        let codec = MockCodec::decoding(100, 100);
        let mut record = TestRecord::default();
        let mut store = MemoryStore::default();
        let options = ResizeOptions::new(SizeSpec::GeometryFit("garbage".into()));

        let result = resize_attachment(&codec, &mut record, &mut store, b"bytes", &options);
        assert!(matches!(result, Err(ProcessError::Spec(_))));
    }

    #[test]
    fn halting_base_stage_prevents_resize() {
        let codec = MockCodec::decoding(800, 600);
        let mut record = TestRecord::default();
        let mut store = MemoryStore::default();
        let options = ResizeOptions::new(SizeSpec::Square(75));

        let pipeline: Pipeline<MockCodec, TestRecord, MemoryStore> = Pipeline::new()
            .stage(FnStage::new(
                "base-process",
                |_ctx: &mut ProcessContext<'_, MockCodec, TestRecord, MemoryStore>| {
                    Ok(StageOutcome::Halt)
                },
            ))
            .stage(ResizeStage);

        let mut ctx = ProcessContext::new(&codec, &mut record, &mut store, b"bytes", &options);
        assert_eq!(pipeline.run(&mut ctx).unwrap(), false);
        assert!(codec.get_operations().is_empty());
    }

    #[test]
    fn stages_run_in_declared_order() {
        let codec = MockCodec::decoding(800, 600);
        let mut record = TestRecord::default();
        let mut store = MemoryStore::default();
        let options = ResizeOptions::new(SizeSpec::Square(75));

        let order = std::sync::Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (order.clone(), order.clone());
        let pipeline: Pipeline<MockCodec, TestRecord, MemoryStore> = Pipeline::new()
            .stage(FnStage::new(
                "base-process",
                move |_ctx: &mut ProcessContext<'_, MockCodec, TestRecord, MemoryStore>| {
                    first.lock().unwrap().push("base-process");
                    Ok(StageOutcome::Continue)
                },
            ))
            .stage(FnStage::new(
                "marker",
                move |_ctx: &mut ProcessContext<'_, MockCodec, TestRecord, MemoryStore>| {
                    second.lock().unwrap().push("marker");
                    Ok(StageOutcome::Continue)
                },
            ));

        let mut ctx = ProcessContext::new(&codec, &mut record, &mut store, b"bytes", &options);
        assert!(pipeline.run(&mut ctx).unwrap());
        assert_eq!(*order.lock().unwrap(), vec!["base-process", "marker"]);
    }

    #[test]
    fn repeated_resizes_record_newest_output_first() {
        let codec = MockCodec {
            decode_results: Mutex::new(vec![
                Dimensions { width: 400, height: 300 },
                Dimensions { width: 800, height: 600 },
            ]),
            ..MockCodec::default()
        };
        let mut record = TestRecord::default();
        let mut store = MemoryStore::default();
        let options = ResizeOptions::new(SizeSpec::Square(75));

        let pipeline = Pipeline::new().stage(ResizeStage).stage(ResizeStage);
        let mut ctx = ProcessContext::new(&codec, &mut record, &mut store, b"bytes", &options);
        pipeline.run(&mut ctx).unwrap();

        assert_eq!(ctx.outputs.len(), 2);
        // MemoryStore handles are write indices; the latest must be newest.
        assert_eq!(ctx.outputs.latest(), Some(&1));
        let ordered: Vec<_> = ctx.outputs.iter().copied().collect();
        assert_eq!(ordered, vec![1, 0]);
    }
}
