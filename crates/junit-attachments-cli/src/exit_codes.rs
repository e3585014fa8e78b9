//! Exit codes of the `junit-attachments` binary.

use junit_attachments_core::AttachmentError;

pub const EXIT_SUCCESS: i32 = 0;
/// Nothing to show: no record, class or case without attachments.
pub const EXIT_NOT_FOUND: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Map a top-level error to an exit code, preferring the library's own
/// classification when the chain contains an [`AttachmentError`].
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AttachmentError>())
        .map(AttachmentError::exit_code)
        .unwrap_or(EXIT_CONFIG_ERROR)
}
