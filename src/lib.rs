//! # `isiskit` main library
//!
//! This library reads disk images of Intel ISIS-II diskettes, the 8 inch media
//! used by Intellec development systems.  It recovers the directory and the
//! byte-exact contents of every file, and also decodes a couple of flat record
//! formats found on those disks (system images and absolute object modules).
//!
//! ## Architecture
//!
//! Disk operations are built around two layers:
//! * `img::DiskImage` maps a (cylinder,head,sector) coordinate to sector data,
//! does not try to interpret a file system
//! * `fs::isis::Disk` imposes the ISIS-II file system on the decoded sectors
//!
//! When a `fs::isis::Disk` object is created it takes ownership of some
//! `DiskImage` and uses it as read-only storage.  Files are stored as a chain
//! of link blocks, each pointing at up to 62 data sectors; the chain walker
//! lives in `fs::isis` and is shared by the directory reader and the file
//! extractor.
//!
//! ## Disk Images
//!
//! In order to find sectors, `isiskit` must understand the way sector data is
//! packed into the image file.  As of this writing `isiskit` supports
//! * raw sector dumps (BIN, IMG, DSK)
//! * IMD (ImageDisk)
//!
//! Raw dumps are identified by their exact byte count, which also selects the
//! recording layout: 256256 bytes is single density (FM, 26 sectors per
//! track), 512512 bytes is double density (M2FM, 52 sectors per track).
//!
//! ## Record Streams
//!
//! The `obj` module decodes two sequential record formats with no relation to
//! the file system: `obj::sysimage` handles the load records in ISIS.BIN and
//! ISIS.OV0, and `obj::omf` handles Intel absolute object modules.

pub mod img;
pub mod fs;
pub mod obj;
pub mod commands;
pub mod cli;

use img::DiskImage;
use log::{warn,info};

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const KNOWN_FILE_EXTENSIONS: &str = "bin,img,dsk,imd";

/// Given a bytestream return a disk image, or Err if the bytestream cannot
/// be interpreted.  Optional `maybe_ext` restricts the image types that will
/// be tried based on file extension.
pub fn create_img_from_bytestream(disk_img_data: &[u8],maybe_ext: Option<&str>) -> Result<Box<dyn DiskImage>,DYNERR> {
    let ext = match maybe_ext {
        Some(x) => x.to_string().to_lowercase(),
        None => "".to_string()
    };
    if img::imd::file_extensions().contains(&ext) || ext=="" {
        if let Ok(img) = img::imd::Imd::from_bytes(disk_img_data) {
            info!("identified IMD image");
            return Ok(Box::new(img));
        }
    }
    if img::raw::file_extensions().contains(&ext) || ext=="" {
        if let Ok(img) = img::raw::Raw::from_bytes(disk_img_data) {
            info!("identified raw sector dump");
            return Ok(Box::new(img));
        }
    }
    warn!("cannot match any image format");
    return Err(Box::new(img::Error::UnknownImageType));
}

/// Calls `create_img_from_bytestream` getting the bytes from a file.
/// File extension will be used to restrict image types that are tried,
/// unless the extension is unknown, in which case all will be tried.
pub fn create_img_from_file(img_path: &str) -> Result<Box<dyn DiskImage>,DYNERR> {
    match std::fs::read(img_path) {
        Ok(disk_img_data) => {
            let mut maybe_ext = img_path.split('.').last();
            if let Some(ext) = maybe_ext {
                if !KNOWN_FILE_EXTENSIONS.contains(&ext.to_lowercase()) {
                    maybe_ext = None;
                }
            }
            create_img_from_bytestream(&disk_img_data,maybe_ext)
        },
        Err(e) => Err(Box::new(e))
    }
}

/// Given a bytestream return an ISIS-II file system, or Err if the bytestream
/// cannot be interpreted.  The file system takes ownership of the disk image.
pub fn create_fs_from_bytestream(disk_img_data: &[u8],maybe_ext: Option<&str>) -> Result<fs::isis::Disk,DYNERR> {
    let mut img = create_img_from_bytestream(disk_img_data,maybe_ext)?;
    if fs::isis::Disk::test_img(&mut img) {
        info!("identified ISIS-II file system");
        return Ok(fs::isis::Disk::from_img(img));
    }
    warn!("no ISIS-II file system on this image");
    Err(Box::new(fs::Error::FileSystemMismatch))
}

/// Calls `create_fs_from_bytestream` getting the bytes from a file.
pub fn create_fs_from_file(img_path: &str) -> Result<fs::isis::Disk,DYNERR> {
    match std::fs::read(img_path) {
        Ok(disk_img_data) => {
            let mut maybe_ext = img_path.split('.').last();
            if let Some(ext) = maybe_ext {
                if !KNOWN_FILE_EXTENSIONS.contains(&ext.to_lowercase()) {
                    maybe_ext = None;
                }
            }
            create_fs_from_bytestream(&disk_img_data,maybe_ext)
        },
        Err(e) => Err(Box::new(e))
    }
}

/// Display binary to stdout in columns of hex and ascii
pub fn display_block(start_addr: usize,block: &[u8]) {
    let mut slice_start = 0;
    loop {
        let row_label = start_addr + slice_start;
        let mut slice_end = slice_start + 16;
        if slice_end > block.len() {
            slice_end = block.len();
        }
        let slice = &block[slice_start..slice_end];
        let txt: Vec<u8> = slice.iter().map(|c| match *c {
            x if x<32 => '.' as u8,
            x if x<127 => x,
            _ => '.' as u8
        }).collect();
        print!("{:04X} : ",row_label);
        for byte in slice {
            print!("{:02X} ",byte);
        }
        for _blank in slice_end..slice_start+16 {
            print!("   ");
        }
        println!("| {}",String::from_utf8_lossy(&txt));
        slice_start += 16;
        if slice_end==block.len() {
            break;
        }
    }
}
