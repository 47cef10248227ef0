//! # File System Module
//!
//! There is one file system on these disks, handled by the `isis` submodule.
//! The `isis::Disk` object takes ownership of some disk image, which it uses
//! as read-only storage.
//!
//! Transformation of a (track,sector) address to a physical disk address is
//! handled within the `img` module; the mapping is trivial on this media
//! (track = cylinder, head always 0).

pub mod isis;

/// Enumerates file system errors.  The `Display` trait will print the
/// equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file system not compatible with request")]
    FileSystemMismatch,
    #[error("file not found")]
    FileNotFound
}
