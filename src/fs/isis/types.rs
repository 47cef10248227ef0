use std::fmt;
use crate::img;

/// Size of a directory record in bytes
pub const DIR_ENTRY_SIZE: usize = 16;
/// Count of data pointers in one link block
pub const DATA_PTRS_PER_LINK: usize = 62;
/// Link block of ISIS.DIR; this and the other system file locations are
/// fixed by convention on this disk family, they are not discovered.
pub const DIR_LINK_ADDR: SectorAddr = SectorAddr { track: 1, sector: 1 };
/// Attribute bits that must read back zero
pub const ATTR_RESERVED_MASK: u8 = 0x78;

/// Enumerates ISIS-II file system errors.  The `Display` trait will print
/// the equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("link chain is corrupt")]
    ChainCorrupt,
    #[error("directory is corrupt")]
    DirectoryCorrupt,
    #[error("directory length exceeds chain capacity")]
    LengthMismatch,
    #[error("file not found")]
    FileNotFound
}

/// Address of a sector in file system terms.  Tracks count from 0, sectors
/// count from 1.  The all-zero address is reserved as a terminator and can
/// never point at a real sector.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub struct SectorAddr {
    pub track: u8,
    pub sector: u8
}

impl SectorAddr {
    pub const NULL: SectorAddr = SectorAddr { track: 0, sector: 0 };
    /// Unpack an address pair as stored on disk: sector byte first, then track byte
    pub fn from_pair(pair: [u8;2]) -> Self {
        Self { track: pair[1], sector: pair[0] }
    }
    /// Pack the address the way it is stored on disk
    pub fn to_pair(&self) -> [u8;2] {
        [self.sector,self.track]
    }
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

/// Display as `(track,sector)`, the form used in listings and logs
impl fmt::Display for SectorAddr {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"({},{})",self.track,self.sector)
    }
}

/// One 128 byte sector reinterpreted as a node of a file's chain.
/// Bytes 0-1 point back at the previous link block, bytes 2-3 point forward
/// at the next one, and the remaining 62 pairs each address one data sector.
/// A null pair terminates the data, and everything after it must stay null.
pub struct LinkBlock {
    pub prev: SectorAddr,
    pub next: SectorAddr,
    pub pointers: [SectorAddr;DATA_PTRS_PER_LINK]
}

impl LinkBlock {
    pub fn from_sector(dat: &[u8]) -> Self {
        assert!(dat.len()==img::SECTOR_SIZE);
        let mut pointers = [SectorAddr::NULL;DATA_PTRS_PER_LINK];
        for i in 0..DATA_PTRS_PER_LINK {
            pointers[i] = SectorAddr::from_pair([dat[4+i*2],dat[5+i*2]]);
        }
        Self {
            prev: SectorAddr::from_pair([dat[0],dat[1]]),
            next: SectorAddr::from_pair([dat[2],dat[3]]),
            pointers
        }
    }
}

/// The four attribute flags stored with a directory entry.  The meaning of
/// `format` is carried as found; the other three are the usual protections.
#[derive(PartialEq,Eq,Clone,Copy)]
pub struct Attributes {
    pub format: bool,
    pub protected: bool,
    pub system: bool,
    pub invisible: bool
}

impl Attributes {
    /// Decode the attribute byte.  Reserved bits are the caller's problem,
    /// see `ATTR_RESERVED_MASK`.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            format: byte >> 7 & 1 == 1,
            protected: byte >> 2 & 1 == 1,
            system: byte >> 1 & 1 == 1,
            invisible: byte & 1 == 1
        }
    }
}

/// Display in the fixed 4 column form used by the catalog, e.g. `F SI`
impl fmt::Display for Attributes {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{}{}{}{}",
            match self.format { true => "F", false => " " },
            match self.protected { true => "P", false => " " },
            match self.system { true => "S", false => " " },
            match self.invisible { true => "I", false => " " })
    }
}
