//! ### System image load records
//!
//! ISIS.BIN and ISIS.OV0 are stored as a stream of load records, each a pair
//! of little endian words (byte count, load address) followed by the data.
//! A zero byte count terminates the stream, and its load address is the entry
//! point.  Records appear in ascending address order; the gaps between them
//! are memory the loader leaves alone, which flattening fills with zeros.

use log::error;
use crate::DYNERR;

pub struct LoadRecord {
    pub addr: u16,
    pub data: Vec<u8>
}

pub struct SystemImage {
    pub records: Vec<LoadRecord>,
    /// load address carried by the terminating record
    pub entry: u16,
    /// bytes in the stream beyond the terminating record
    pub leftover: usize
}

fn get_2b(dat: &[u8],ptr: usize) -> Result<u16,DYNERR> {
    if ptr+2 > dat.len() {
        error!("record stream ended inside a word at {}",ptr);
        return Err(Box::new(super::Error::Truncated));
    }
    Ok(u16::from_le_bytes([dat[ptr],dat[ptr+1]]))
}

impl SystemImage {
    pub fn parse(dat: &[u8]) -> Result<Self,DYNERR> {
        let mut records = Vec::new();
        let mut ptr = 0;
        let mut prev_end: usize = 0;
        loop {
            let count = get_2b(dat,ptr)? as usize;
            let addr = get_2b(dat,ptr+2)?;
            ptr += 4;
            if count==0 {
                return Ok(Self {
                    records,
                    entry: addr,
                    leftover: dat.len() - ptr
                });
            }
            if ptr+count > dat.len() {
                error!("record at {:#06x} runs past the end of the stream",addr);
                return Err(Box::new(super::Error::Truncated));
            }
            if (addr as usize) < prev_end {
                error!("record at {:#06x} loads below the previous record's end {:#06x}",addr,prev_end);
                return Err(Box::new(super::Error::RecordOrder));
            }
            prev_end = addr as usize + count;
            records.push(LoadRecord {
                addr,
                data: dat[ptr..ptr+count].to_vec()
            });
            ptr += count;
        }
    }
    /// Assemble the records into one memory image starting at address 0,
    /// with the unloaded gaps filled by zeros.
    pub fn flatten(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        for rec in &self.records {
            ans.resize(rec.addr as usize,0);
            ans.extend_from_slice(&rec.data);
        }
        ans
    }
    /// Write the record summary to standard output
    pub fn list_to_stdout(&self) {
        for rec in &self.records {
            println!("addr {:04x}, end {:04x}, length {}",rec.addr,rec.addr as usize + rec.data.len() - 1,rec.data.len());
        }
        println!("end record, addr {:04x}",self.entry);
        if self.leftover > 0 {
            println!("leftover {} bytes",self.leftover);
        }
    }
}
