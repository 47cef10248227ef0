//! # Object Module
//!
//! Decoders for the two flat record streams found on these disks: the load
//! records making up the operating system images (ISIS.BIN, ISIS.OV0), and
//! Intel absolute object modules.  Neither format has any block structure;
//! each is a single pass over sequential records.

pub mod sysimage;
pub mod omf;

/// Enumerates record stream errors.  The `Display` trait will print the
/// equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("record stream ended early")]
    Truncated,
    #[error("bad checksum found in a record")]
    BadChecksum,
    #[error("record out of order")]
    RecordOrder
}
