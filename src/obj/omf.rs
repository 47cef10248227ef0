//! ### Intel absolute object modules
//!
//! An absolute OMF file is a stream of records of the form (type, length,
//! payload, checksum), where the 16 bit length counts the payload and the
//! checksum, and the byte sum of the whole record is 0 mod 256.  Only the
//! record types that occur in absolute modules are interpreted; anything
//! else is carried raw, since the reference tools tolerate it.

use num_traits::FromPrimitive;
use num_derive::FromPrimitive;
use log::{warn,error};
use crate::DYNERR;

#[derive(FromPrimitive,PartialEq,Clone,Copy)]
pub enum RecordType {
    ModuleHeader = 0x02,
    ModuleEnd = 0x04,
    Content = 0x06,
    Eof = 0x0e
}

pub struct Record {
    pub rtype: u8,
    pub payload: Vec<u8>
}

/// Interpreted view of a record, borrowed from its payload
pub enum RecordView<'a> {
    /// module name
    ModuleHeader(&'a str),
    /// (main module, segment id, offset)
    ModuleEnd(bool,u8,u16),
    /// (segment id, load offset, data)
    Content(u8,u16,&'a [u8]),
    Eof,
    Unknown
}

impl Record {
    /// Interpret the payload according to the record type.  Malformed
    /// payloads of known types are an error; unknown types are not.
    pub fn view(&self) -> Result<RecordView,DYNERR> {
        match RecordType::from_u8(self.rtype) {
            Some(RecordType::ModuleHeader) => {
                if self.payload.len()<3 || self.payload[0] as usize + 3 != self.payload.len() {
                    error!("module header record length is inconsistent");
                    return Err(Box::new(super::Error::Truncated));
                }
                let name_end = 1 + self.payload[0] as usize;
                if self.payload[name_end]!=0 || self.payload[name_end+1]!=0 {
                    error!("module header record does not end in zero words");
                    return Err(Box::new(super::Error::Truncated));
                }
                match std::str::from_utf8(&self.payload[1..name_end]) {
                    Ok(name) if name.is_ascii() => Ok(RecordView::ModuleHeader(name)),
                    _ => {
                        error!("module name is not ascii");
                        Err(Box::new(super::Error::Truncated))
                    }
                }
            },
            Some(RecordType::ModuleEnd) => {
                if self.payload.len()<4 {
                    error!("module end record is too short");
                    return Err(Box::new(super::Error::Truncated));
                }
                Ok(RecordView::ModuleEnd(self.payload[0]==1,self.payload[1],u16::from_le_bytes([self.payload[2],self.payload[3]])))
            },
            Some(RecordType::Content) => {
                if self.payload.len()<3 {
                    error!("content record is too short");
                    return Err(Box::new(super::Error::Truncated));
                }
                Ok(RecordView::Content(self.payload[0],u16::from_le_bytes([self.payload[1],self.payload[2]]),&self.payload[3..]))
            },
            Some(RecordType::Eof) => Ok(RecordView::Eof),
            None => {
                warn!("unknown record type {:#04x}, payload {}",self.rtype,hex::encode(&self.payload));
                Ok(RecordView::Unknown)
            }
        }
    }
}

/// Parse the whole stream, verifying every record's checksum.
pub fn parse(dat: &[u8]) -> Result<Vec<Record>,DYNERR> {
    let mut ans = Vec::new();
    let mut ptr = 0;
    while ptr < dat.len() {
        if ptr+3 > dat.len() {
            error!("record stream ended inside a header at {}",ptr);
            return Err(Box::new(super::Error::Truncated));
        }
        let rtype = dat[ptr];
        let length = u16::from_le_bytes([dat[ptr+1],dat[ptr+2]]) as usize;
        if length<1 || ptr+3+length > dat.len() {
            error!("record of type {:#04x} at {} runs past the end of the stream",rtype,ptr);
            return Err(Box::new(super::Error::Truncated));
        }
        let mut sum: u8 = 0;
        for i in ptr..ptr+3+length {
            sum = sum.wrapping_add(dat[i]);
        }
        if sum!=0 {
            error!("bad checksum in record of type {:#04x} at {}",rtype,ptr);
            return Err(Box::new(super::Error::BadChecksum));
        }
        ans.push(Record {
            rtype,
            payload: dat[ptr+3..ptr+2+length].to_vec()
        });
        ptr += 3+length;
    }
    Ok(ans)
}

/// Write the record summary to standard output
pub fn dump_to_stdout(dat: &[u8]) -> crate::STDRESULT {
    for rec in parse(dat)? {
        print!("type {:02x} length {} - ",rec.rtype,rec.payload.len()+1);
        match rec.view()? {
            RecordView::ModuleHeader(name) => {
                println!("header");
                println!("name: '{}'",name);
            },
            RecordView::ModuleEnd(main,seg,offset) => {
                println!("module end");
                println!("{} module, segment {:02x}, offset {:04x}",match main { true => "main", false => "not main" },seg,offset);
            },
            RecordView::Content(seg,offset,data) => {
                println!("content");
                println!("segment {:02x}, offset {:04x}, {} data bytes",seg,offset,data.len());
            },
            RecordView::Eof => println!("end of file"),
            RecordView::Unknown => println!("unknown")
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rtype: u8,payload: &[u8]) -> Vec<u8> {
        let length = payload.len() as u16 + 1;
        let mut ans = vec![rtype];
        ans.append(&mut u16::to_le_bytes(length).to_vec());
        ans.append(&mut payload.to_vec());
        let mut sum: u8 = 0;
        for b in &ans {
            sum = sum.wrapping_add(*b);
        }
        ans.push(0u8.wrapping_sub(sum));
        ans
    }

    #[test]
    fn module_round_trip() {
        let stream = [
            record(0x02,&[4,b'T',b'E',b'S',b'T',0,0]),
            record(0x06,&[1,0x00,0x40,0xc3,0x00,0x40]),
            record(0x04,&[1,1,0x00,0x40]),
            record(0x0e,&[])
        ].concat();
        let recs = parse(&stream).expect("parse failed");
        assert_eq!(recs.len(),4);
        match recs[0].view().expect("view failed") {
            RecordView::ModuleHeader(name) => assert_eq!(name,"TEST"),
            _ => panic!("wrong view")
        }
        match recs[1].view().expect("view failed") {
            RecordView::Content(seg,offset,data) => {
                assert_eq!(seg,1);
                assert_eq!(offset,0x4000);
                assert_eq!(data,&[0xc3,0x00,0x40]);
            },
            _ => panic!("wrong view")
        }
        match recs[2].view().expect("view failed") {
            RecordView::ModuleEnd(main,seg,offset) => {
                assert!(main);
                assert_eq!(seg,1);
                assert_eq!(offset,0x4000);
            },
            _ => panic!("wrong view")
        }
        assert!(matches!(recs[3].view().expect("view failed"),RecordView::Eof));
    }

    #[test]
    fn checksum_rejection() {
        let mut stream = record(0x0e,&[]);
        let last = stream.len()-1;
        stream[last] = stream[last].wrapping_add(1);
        assert!(parse(&stream).is_err());
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let stream = record(0x10,&[1,2,3]);
        let recs = parse(&stream).expect("parse failed");
        assert!(matches!(recs[0].view().expect("view failed"),RecordView::Unknown));
    }

    #[test]
    fn truncated_stream() {
        let mut stream = record(0x0e,&[]);
        stream.pop();
        assert!(parse(&stream).is_err());
    }
}
