//! # ISIS-II file system module
//!
//! This reads disk images containing one standard ISIS-II volume, i.e., the
//! disks used by Intel Intellec development systems.  Files are stored as a
//! doubly linked chain of link blocks, each carrying up to 62 pointers to
//! data sectors.  The directory (ISIS.DIR) is itself such a file, rooted at
//! the fixed address (1,1), so one chain walker serves both the directory
//! and ordinary files.
//!
//! The module never writes to the file system; images are opened to be read.
//! Any deviation from the expected layout stops the operation with an error
//! naming the failed check, rather than producing silently wrong output.

pub mod types;
pub mod directory;

use log::{trace,debug,error};
use types::*;
use directory::{DirectoryEntry,decode_directory};
use crate::img;
use crate::{STDRESULT,DYNERR};

/// The primary interface for disk operations.
pub struct Disk {
    img: Box<dyn img::DiskImage>
}

impl Disk {
    /// Create a file system object using the given image as storage.
    /// The file system takes ownership of the image.
    pub fn from_img(img: Box<dyn img::DiskImage>) -> Self {
        Self {
            img
        }
    }
    /// Test an image for the ISIS-II file system by trying to read the
    /// directory from its fixed location.
    pub fn test_img(img: &mut Box<dyn img::DiskImage>) -> bool {
        let maybe_entries = match chain_walk(img.as_mut(),DIR_LINK_ADDR) {
            Ok(raw) => decode_directory(&raw),
            Err(e) => Err(e)
        };
        match maybe_entries {
            Ok(entries) => {
                debug!("directory has {} active entries",entries.len());
                true
            },
            Err(e) => {
                debug!("directory scan failed ({})",e);
                false
            }
        }
    }
    /// Walk the chain of link blocks rooted at `start` and concatenate the
    /// data sectors it references.  The result runs to the chain's capacity;
    /// callers that know a byte length must truncate.
    pub fn read_chain(&mut self,start: SectorAddr) -> Result<Vec<u8>,DYNERR> {
        chain_walk(self.img.as_mut(),start)
    }
    /// Read the directory from its fixed location into active entries,
    /// preserving on-disk record order.
    pub fn get_directory(&mut self) -> Result<Vec<DirectoryEntry>,DYNERR> {
        let raw = self.read_chain(DIR_LINK_ADDR)?;
        decode_directory(&raw)
    }
    /// Read a file's exact content.  The chain may store more than the
    /// directory declares, because the final sector is only partly used; it
    /// must never store less.
    pub fn extract_file(&mut self,entry: &DirectoryEntry) -> Result<Vec<u8>,DYNERR> {
        let chain = self.read_chain(entry.link_addr)?;
        if chain.len() < entry.length {
            error!("directory wants {} bytes but the chain at {} stores {}",entry.length,entry.link_addr,chain.len());
            return Err(Box::new(Error::LengthMismatch));
        }
        Ok(chain[0..entry.length].to_vec())
    }
    /// Look up a file by name (as displayed, case insensitive) and extract it
    pub fn read_file(&mut self,name: &str) -> Result<Vec<u8>,DYNERR> {
        let entries = self.get_directory()?;
        for entry in &entries {
            if entry.filename()==name.to_lowercase() {
                return self.extract_file(entry);
            }
        }
        Err(Box::new(Error::FileNotFound))
    }
    /// Return the names matching a glob pattern, matching is case insensitive
    pub fn glob(&mut self,pattern: &str) -> Result<Vec<String>,DYNERR> {
        let glob = globset::Glob::new(&pattern.to_lowercase())?.compile_matcher();
        let mut ans = Vec::new();
        for entry in self.get_directory()? {
            let name = entry.filename();
            if glob.is_match(&name) {
                ans.push(name);
            }
        }
        Ok(ans)
    }
    /// List all the files on the disk to standard output
    pub fn catalog_to_stdout(&mut self) -> STDRESULT {
        let entries = self.get_directory()?;
        for entry in &entries {
            println!("{:<10} {} {:>6} {}",entry.filename(),entry.attributes,entry.length,entry.link_addr);
        }
        Ok(())
    }
    /// Mutably borrow the underlying disk image
    pub fn get_img(&mut self) -> &mut Box<dyn img::DiskImage> {
        &mut self.img
    }
}

/// The chain walker behind `Disk::read_chain`.  Traversal state is the pair
/// (expected back pointer, EOF latch); the latch is set by the first null
/// data pointer anywhere in the chain and persists across link blocks.
fn chain_walk(img: &mut dyn img::DiskImage,start: SectorAddr) -> Result<Vec<u8>,DYNERR> {
    let mut ans: Vec<u8> = Vec::new();
    let mut expected_prev = SectorAddr::NULL;
    let mut eof_reached = false;
    let mut link_addr = start;
    while !link_addr.is_null() {
        trace!("read link block {}",link_addr);
        let buf = img.read_sector(link_addr.track as usize,0,link_addr.sector as usize)?;
        let link = LinkBlock::from_sector(&buf);
        if link.prev != expected_prev {
            error!("link block at {} points back at {}, expected {}",link_addr,link.prev,expected_prev);
            return Err(Box::new(Error::ChainCorrupt));
        }
        for ptr in link.pointers {
            if eof_reached {
                if !ptr.is_null() {
                    error!("data pointer {} found after the chain ended",ptr);
                    return Err(Box::new(Error::ChainCorrupt));
                }
            } else if ptr.is_null() {
                eof_reached = true;
            } else {
                let mut sec = img.read_sector(ptr.track as usize,0,ptr.sector as usize)?;
                ans.append(&mut sec);
            }
        }
        expected_prev = link_addr;
        link_addr = link.next;
    }
    // the null data pointer is the terminator, a chain may not end without one
    if !start.is_null() && !eof_reached {
        error!("the chain ended at {} without its terminator",expected_prev);
        return Err(Box::new(Error::ChainCorrupt));
    }
    Ok(ans)
}
