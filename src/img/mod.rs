//! # Disk Image Module
//!
//! Disk images are represented by objects implementing the `DiskImage` trait.
//! The object is named for the image type it handles, e.g., `Imd`.
//!
//! The trait is deliberately small: ISIS-II diskettes always have 77 tracks of
//! 128 byte sectors on one side, so the only geometric variable is the sector
//! count per track, which follows from the recording mode.  The `fs` module
//! reads and writes through this trait and never touches the image encoding.
//!
//! An important design element is that an image can refuse a request as out of
//! range: callers get an error for a bad coordinate, never a clamped sector.

pub mod raw;
pub mod imd;

use std::str::FromStr;
use std::fmt;
use crate::{STDRESULT,DYNERR};

/// Tracks per diskette, both densities.  These disks are single sided,
/// so track and cylinder can be used interchangeably.
pub const TRACKS: usize = 77;
/// Sector size, both densities
pub const SECTOR_SIZE: usize = 128;

/// Enumerates disk image errors.  The `Display` trait will print the
/// equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("unknown image type")]
    UnknownImageType,
    #[error("image size did not match a known layout")]
    ImageSizeMismatch,
    #[error("image type not compatible with request")]
    ImageTypeMismatch,
    #[error("unable to access sector")]
    SectorAccess,
    #[error("unable to access track")]
    TrackAccess
}

/// The recording layout of the diskette.  The two kinds differ only in the
/// sector count and the flux code used on the physical media.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum DiskKind {
    /// FM encoding, 26 sectors per track
    SingleDensity,
    /// M2FM encoding, 52 sectors per track
    DoubleDensity
}

#[derive(PartialEq,Eq,Clone,Copy)]
pub enum DiskImageType {
    RAW,
    IMD
}

impl DiskKind {
    /// Sectors per track for this layout
    pub fn sectors(&self) -> usize {
        match self {
            Self::SingleDensity => 26,
            Self::DoubleDensity => 52
        }
    }
    pub fn byte_capacity(&self) -> usize {
        TRACKS * self.sectors() * SECTOR_SIZE
    }
}

/// Allows the disk kind to be displayed to the console using `println!`.  This
/// also derives `to_string`, so the enum can be converted to `String`.
impl fmt::Display for DiskKind {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleDensity => write!(f,"8 inch SSSD (FM)"),
            Self::DoubleDensity => write!(f,"8 inch SSDD (M2FM)")
        }
    }
}

/// match command line argument to disk kind
impl FromStr for DiskKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s {
            "sd" => Ok(Self::SingleDensity),
            "dd" => Ok(Self::DoubleDensity),
            _ => Err(Error::UnknownImageType)
        }
    }
}

impl FromStr for DiskImageType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s {
            "bin" => Ok(Self::RAW),
            "img" => Ok(Self::RAW),
            "dsk" => Ok(Self::RAW),
            "imd" => Ok(Self::IMD),
            _ => Err(Error::UnknownImageType)
        }
    }
}

impl fmt::Display for DiskImageType {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RAW => write!(f,"bin"),
            Self::IMD => write!(f,"imd")
        }
    }
}

/// The main trait for working with any kind of disk image.
/// The corresponding trait object serves as storage for `fs::isis::Disk`.
/// Reading can mutate the object because the image may be keeping track of
/// the head position or other status indicators.
pub trait DiskImage {
    fn track_count(&self) -> usize;
    /// Get the integrated storage capacity of the formatted tracks
    fn byte_capacity(&self) -> usize;
    fn kind(&self) -> DiskKind;
    fn what_am_i(&self) -> DiskImageType;
    fn file_extensions(&self) -> Vec<String>;
    fn from_bytes(buf: &[u8]) -> Result<Self,DYNERR> where Self: Sized;
    fn to_bytes(&mut self) -> Vec<u8>;
    /// Read a physical sector from the image; can affect disk state
    fn read_sector(&mut self,cyl: usize,head: usize,sec: usize) -> Result<Vec<u8>,DYNERR>;
    /// Write a physical sector to the image
    fn write_sector(&mut self,cyl: usize,head: usize,sec: usize,dat: &[u8]) -> STDRESULT;
}

/// If a data source is smaller than `quantum` bytes, pad it with zeros.
/// If it is larger, do not include the extra bytes.
pub fn quantize_block(src: &[u8],quantum: usize) -> Vec<u8> {
    let mut padded: Vec<u8> = Vec::new();
    for i in 0..quantum {
        if i<src.len() {
            padded.push(src[i])
        } else {
            padded.push(0);
        }
    }
    return padded;
}
