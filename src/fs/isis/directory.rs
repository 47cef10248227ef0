//! ### ISIS-II directory records
//!
//! The directory is itself a chained file (ISIS.DIR), whose content is a
//! sequence of 16 byte records.  This module decodes those records; walking
//! the chain that stores them is `Disk`'s business.

use log::error;
use super::types::*;
use crate::DYNERR;

const STATUS_ACTIVE: u8 = 0x00;
const STATUS_UNUSED: u8 = 0x7f;
const STATUS_DELETED: u8 = 0xff;

/// Decoded form of an active 16 byte directory record
#[derive(Clone)]
pub struct DirectoryEntry {
    pub basename: String,
    pub extension: String,
    pub attributes: Attributes,
    /// bytes used in the file's final data sector
    pub eof_count: u8,
    /// count of data sectors occupied, including the final partial one
    pub sector_count: u16,
    /// root of the file's link block chain
    pub link_addr: SectorAddr,
    /// exact byte length derived from `sector_count` and `eof_count`
    pub length: usize
}

impl DirectoryEntry {
    /// Lower cased `name` or `name.ext`, suitable as a host file name
    pub fn filename(&self) -> String {
        let mut ans = self.basename.clone();
        if self.extension.len()>0 {
            ans += ".";
            ans += &self.extension;
        }
        ans.to_lowercase()
    }
}

fn name_field(dat: &[u8]) -> Result<String,DYNERR> {
    for byte in dat {
        if *byte != 0 && (*byte < 0x20 || *byte > 0x7e) {
            error!("directory name field contains byte {:#04x}",byte);
            return Err(Box::new(Error::DirectoryCorrupt));
        }
    }
    let ascii = String::from_utf8(dat.to_vec()).expect("unreachable");
    Ok(ascii.trim_end_matches('\0').to_string())
}

/// Decode one 16 byte record.  Unused and deleted records come back as None,
/// anything that is not exactly active, unused, or deleted is corruption.
pub fn decode_entry(dat: &[u8]) -> Result<Option<DirectoryEntry>,DYNERR> {
    assert!(dat.len()==DIR_ENTRY_SIZE);
    match dat[0] {
        STATUS_UNUSED => return Ok(None),
        STATUS_DELETED => return Ok(None),
        STATUS_ACTIVE => {},
        byte => {
            error!("directory record has status {:#04x}",byte);
            return Err(Box::new(Error::DirectoryCorrupt));
        }
    }
    if dat[10] & ATTR_RESERVED_MASK != 0 {
        error!("reserved attribute bits are set in {:#04x}",dat[10]);
        return Err(Box::new(Error::DirectoryCorrupt));
    }
    let basename = name_field(&dat[1..7])?;
    let extension = name_field(&dat[7..10])?;
    let sector_count = u16::from_le_bytes([dat[12],dat[13]]);
    if sector_count==0 {
        error!("directory record for {} has no sectors",basename);
        return Err(Box::new(Error::DirectoryCorrupt));
    }
    let eof_count = dat[11];
    Ok(Some(DirectoryEntry {
        basename,
        extension,
        attributes: Attributes::from_byte(dat[10]),
        eof_count,
        sector_count,
        link_addr: SectorAddr::from_pair([dat[14],dat[15]]),
        length: sector_count as usize * crate::img::SECTOR_SIZE - crate::img::SECTOR_SIZE + eof_count as usize
    }))
}

/// Decode the raw directory file into its active entries, preserving the
/// on-disk record order.
pub fn decode_directory(raw: &[u8]) -> Result<Vec<DirectoryEntry>,DYNERR> {
    if raw.len() % DIR_ENTRY_SIZE != 0 {
        error!("directory length {} is not a multiple of {}",raw.len(),DIR_ENTRY_SIZE);
        return Err(Box::new(Error::DirectoryCorrupt));
    }
    let mut ans = Vec::new();
    for i in 0..raw.len()/DIR_ENTRY_SIZE {
        if let Some(entry) = decode_entry(&raw[i*DIR_ENTRY_SIZE..(i+1)*DIR_ENTRY_SIZE])? {
            ans.push(entry);
        }
    }
    Ok(ans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_record(name: &str,ext: &str,attr: u8,eof: u8,secs: u16,link: [u8;2]) -> [u8;16] {
        let mut dat = [0;16];
        for (i,b) in name.bytes().enumerate() {
            dat[1+i] = b;
        }
        for (i,b) in ext.bytes().enumerate() {
            dat[7+i] = b;
        }
        dat[10] = attr;
        dat[11] = eof;
        let count = u16::to_le_bytes(secs);
        dat[12] = count[0];
        dat[13] = count[1];
        dat[14] = link[0];
        dat[15] = link[1];
        dat
    }

    #[test]
    fn entry_fields() {
        let dat = active_record("ISIS","BIN",0x86,52,87,[4,2]);
        let entry = decode_entry(&dat).expect("decode failed").expect("entry skipped");
        assert_eq!(entry.basename,"ISIS");
        assert_eq!(entry.extension,"BIN");
        assert_eq!(entry.filename(),"isis.bin");
        assert!(entry.attributes.format && entry.attributes.protected && entry.attributes.system);
        assert!(!entry.attributes.invisible);
        assert_eq!(entry.link_addr,SectorAddr { track: 2, sector: 4 });
        assert_eq!(entry.length,87*128-128+52);
    }

    #[test]
    fn skips_and_corruption() {
        let mut dat = active_record("JUNK","",0,10,1,[2,3]);
        dat[0] = 0x7f;
        assert!(decode_entry(&dat).expect("unused must not error").is_none());
        dat[0] = 0xff;
        assert!(decode_entry(&dat).expect("deleted must not error").is_none());
        dat[0] = 0x01;
        assert!(decode_entry(&dat).is_err());
    }

    #[test]
    fn reserved_attributes() {
        let dat = active_record("A","",0x08,10,1,[2,3]);
        assert!(decode_entry(&dat).is_err());
    }

    #[test]
    fn ragged_directory() {
        let dat = active_record("A","",0,10,1,[2,3]);
        assert!(decode_directory(&dat[0..12]).is_err());
        assert_eq!(decode_directory(&dat).expect("decode failed").len(),1);
    }
}
