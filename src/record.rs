//! Attachment record capability.
//!
//! A record type opts into post-save resizing by implementing
//! [`AttachmentRecord`]. The pipeline writes the final dimensions back and
//! emits one [`after_resize`](AttachmentRecord::after_resize) notification
//! carrying the decoded image handle; records that don't care about the
//! notification keep the default no-op.

/// Capability interface for records that own a resizable attachment.
///
/// `I` is the codec's decoded image type.
pub trait AttachmentRecord<I> {
    /// Store the resized image's dimensions on the record.
    fn set_dimensions(&mut self, width: u32, height: u32);

    /// Post-resize notification with the resized image handle.
    fn after_resize(&mut self, _image: &I) {}
}
