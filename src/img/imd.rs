//! ## Support for IMD disk images
//!
//! Most archived ISIS-II diskettes circulate in this format, since ImageDisk
//! was written with 8 inch media in mind.  The format records a mode byte per
//! track along with the sector numbering map, so it can represent both the FM
//! and M2FM recordings (the latter goes by the MFM mode code, ImageDisk has no
//! code of its own for Intel M2FM).
//!
//! Only the subset of IMD that can occur on these diskettes is accepted:
//! one-sided images, 128 byte sectors, up to 77 cylinders.

use chrono;
use num_traits::FromPrimitive;
use num_derive::FromPrimitive;
use log::{warn,info,trace,debug,error};
use crate::img;
use crate::{STDRESULT,DYNERR};

pub enum Mode {
    Fm500Kbps = 0,
    Fm300Kbps = 1,
    Fm250Kbps = 2,
    Mfm500Kbps = 3,
    Mfm300Kbps = 4,
    Mfm250Kbps = 5
}

pub const CYL_MAP_FLAG: u8 = 0x80;
pub const HEAD_MAP_FLAG: u8 = 0x40;
pub const HEAD_MASK: u8 = 0b1111;

pub fn file_extensions() -> Vec<String> {
    vec!["imd".to_string()]
}

#[derive(FromPrimitive)]
pub enum SectorData {
    None = 0,
    Normal = 1,
    NormalCompressed = 2,
    NormalDeleted = 3,
    NormalCompressedDeleted = 4,
    Error = 5,
    ErrorCompressed = 6,
    ErrorDeleted = 7,
    ErrorCompressedDeleted = 8
}

pub fn is_slice_uniform(slice: &[u8]) -> bool {
    if slice.len()<1 {
        return true;
    }
    let test = slice[0];
    for i in 1..slice.len() {
        if slice[i]!=test {
            return false;
        }
    }
    true
}

pub struct Track {
    mode: u8,
    cylinder: u8,
    head: u8,
    sectors: u8,
    sector_shift: u8,
    /// order is not important (maybe geometrical), value is physical sector address
    sector_map: Vec<u8>,
    cylinder_map: Vec<u8>,
    head_map: Vec<u8>,
    /// per sector, one data code byte followed by the sector data
    /// (or a single fill byte while compressed)
    track_buf: Vec<u8>
}

/// There is a trivial compression scheme for the track data.
/// Compression happens when the structure is flattened.
/// Expansion happens when the structure is unflattened.
/// Hence while we are working with the disk it is always expanded.
pub struct Imd {
    kind: img::DiskKind,
    header: [u8;29],
    comment: String,
    terminator: u8,
    tracks: Vec<Track>
}

impl Track {
    fn create(track_num: usize,kind: img::DiskKind) -> Self {
        let mode = match kind {
            img::DiskKind::SingleDensity => Mode::Fm500Kbps as u8,
            img::DiskKind::DoubleDensity => Mode::Mfm500Kbps as u8
        };
        let sector_map: Vec<u8> = (1..kind.sectors() as u8+1).collect();
        let mut track_buf: Vec<u8> = vec![0;sector_map.len()*(img::SECTOR_SIZE+1)];
        for i in 0..sector_map.len() {
            track_buf[i*(img::SECTOR_SIZE+1)] = SectorData::Normal as u8;
        }
        Self {
            mode,
            cylinder: track_num as u8,
            head: 0,
            sectors: kind.sectors() as u8,
            sector_shift: 0,
            sector_map,
            cylinder_map: Vec::new(),
            head_map: Vec::new(),
            track_buf
        }
    }
    /// get the byte count of the sector buffer given the sector code
    fn get_sec_buf_size(&self,sector_code: u8) -> usize {
        let sec_size = img::SECTOR_SIZE << self.sector_shift;
        match SectorData::from_u8(sector_code) {
            Some(SectorData::None) => 1,
            Some(SectorData::Normal) => 1 + sec_size,
            Some(SectorData::NormalCompressed) => 2,
            Some(SectorData::NormalCompressedDeleted) => 2,
            Some(SectorData::NormalDeleted) => 1 + sec_size,
            Some(SectorData::Error) => 1 + sec_size,
            Some(SectorData::ErrorCompressed) => 2,
            Some(SectorData::ErrorCompressedDeleted) => 2,
            Some(SectorData::ErrorDeleted) => 1 + sec_size,
            _ => panic!("unexpected sector data type")
        }
    }
    /// offset into `track_buf` of the code byte for the idx'th sector in the map
    fn buf_offset(&self,idx: usize) -> usize {
        let mut ptr = 0;
        for _i in 0..idx {
            ptr += self.get_sec_buf_size(self.track_buf[ptr]);
        }
        ptr
    }
    /// compress sectors with uniform data
    fn compress(&self) -> Track {
        let mut track_buf: Vec<u8> = Vec::new();
        let mut ptr = 0;
        for isec in 0..self.sectors {
            let sec_size = self.get_sec_buf_size(self.track_buf[ptr]);
            let slice = &self.track_buf[ptr..ptr+sec_size];
            if sec_size > 2 && is_slice_uniform(&slice[1..]) {
                trace!("compressing cyl {} sec {}",self.cylinder,self.sector_map[isec as usize]);
                track_buf.push(slice[0]+1); // adding 1 gives the id of the compressed data
                track_buf.push(slice[1]); // first element is all we need
            } else {
                track_buf.append(&mut slice.to_vec());
            }
            ptr += sec_size;
        }
        Self {
            mode: self.mode,
            cylinder: self.cylinder,
            head: self.head,
            sectors: self.sectors,
            sector_shift: self.sector_shift,
            sector_map: self.sector_map.clone(),
            cylinder_map: self.cylinder_map.clone(),
            head_map: self.head_map.clone(),
            track_buf
        }
    }
    /// expand sectors with uniform data
    fn expand(&self) -> Track {
        let mut track_buf: Vec<u8> = Vec::new();
        let mut ptr = 0;
        for isec in 0..self.sectors {
            let sec_size = self.get_sec_buf_size(self.track_buf[ptr]);
            let slice = &self.track_buf[ptr..ptr+sec_size];
            if sec_size == 2 {
                trace!("expanding cyl {} sec {}",self.cylinder,self.sector_map[isec as usize]);
                track_buf.push(slice[0]-1); // subtracting 1 gives the id of the expanded data
                track_buf.append(&mut vec![slice[1];img::SECTOR_SIZE << self.sector_shift]);
            } else {
                track_buf.append(&mut slice.to_vec());
            }
            ptr += sec_size;
        }
        Self {
            mode: self.mode,
            cylinder: self.cylinder,
            head: self.head,
            sectors: self.sectors,
            sector_shift: self.sector_shift,
            sector_map: self.sector_map.clone(),
            cylinder_map: self.cylinder_map.clone(),
            head_map: self.head_map.clone(),
            track_buf
        }
    }
    /// Unflatten a track record starting at the front of `bytes`, returning
    /// the track (still compressed) and the count of bytes consumed.
    fn from_bytes(bytes: &[u8]) -> Result<(Self,usize),DYNERR> {
        if bytes.len()<5 {
            error!("unexpected end of data in IMD track record");
            return Err(Box::new(img::Error::TrackAccess));
        }
        let mut ans = Self {
            mode: bytes[0],
            cylinder: bytes[1],
            head: bytes[2],
            sectors: bytes[3],
            sector_shift: bytes[4],
            sector_map: Vec::new(),
            cylinder_map: Vec::new(),
            head_map: Vec::new(),
            track_buf: Vec::new()
        };
        if ans.mode > 5 {
            error!("unknown mode {} in IMD track record",ans.mode);
            return Err(Box::new(img::Error::TrackAccess));
        }
        if ans.sector_shift > 7 {
            error!("sector size shift {} is not supported",ans.sector_shift);
            return Err(Box::new(img::Error::TrackAccess));
        }
        debug!("Cylinder {}, Head {}: {} sectors x {} bytes",ans.cylinder,ans.head & HEAD_MASK,ans.sectors,img::SECTOR_SIZE << ans.sector_shift);
        let check = |ptr: usize| -> STDRESULT {
            match ptr <= bytes.len() {
                true => Ok(()),
                false => {
                    error!("unexpected end of data at {}",bytes.len());
                    Err(Box::new(img::Error::TrackAccess))
                }
            }
        };
        let mut ptr: usize = 5;
        check(ptr+ans.sectors as usize)?;
        ans.sector_map = bytes[ptr..ptr+ans.sectors as usize].to_vec();
        trace!("sector map {:?}",ans.sector_map);
        ptr += ans.sectors as usize;
        if ans.head & CYL_MAP_FLAG == CYL_MAP_FLAG {
            check(ptr+ans.sectors as usize)?;
            ans.cylinder_map = bytes[ptr..ptr+ans.sectors as usize].to_vec();
            debug!("found cylinder map {:?}",ans.cylinder_map);
            ptr += ans.sectors as usize;
        }
        if ans.head & HEAD_MAP_FLAG == HEAD_MAP_FLAG {
            check(ptr+ans.sectors as usize)?;
            ans.head_map = bytes[ptr..ptr+ans.sectors as usize].to_vec();
            debug!("found head map {:?}",ans.head_map);
            ptr += ans.sectors as usize;
        }
        for _lsec in 0..ans.sectors {
            check(ptr+1)?;
            if bytes[ptr] > SectorData::ErrorCompressedDeleted as u8 {
                error!("unknown sector data code {}",bytes[ptr]);
                return Err(Box::new(img::Error::TrackAccess));
            }
            let sec_size = ans.get_sec_buf_size(bytes[ptr]);
            check(ptr+sec_size)?;
            ans.track_buf.append(&mut bytes[ptr..ptr+sec_size].to_vec());
            ptr += sec_size;
        }
        Ok((ans,ptr))
    }
    fn to_bytes(&self) -> Vec<u8> {
        [
            vec![self.mode,self.cylinder,self.head,self.sectors,self.sector_shift],
            self.sector_map.clone(),
            self.cylinder_map.clone(),
            self.head_map.clone(),
            self.track_buf.clone()
        ].concat()
    }
}

impl Imd {
    /// Create a blank formatted image of the given kind
    pub fn create(kind: img::DiskKind) -> Self {
        let now = chrono::Local::now().naive_local();
        let header = "IMD 1.18: ".to_string() + &now.format("%d/%m/%Y %H:%M:%S").to_string();
        let creator_str = "isiskit v".to_string() + env!("CARGO_PKG_VERSION");
        debug!("header {}",header);
        let mut tracks: Vec<Track> = Vec::new();
        for track in 0..img::TRACKS {
            tracks.push(Track::create(track,kind));
        }
        Self {
            kind,
            header: header.as_bytes().try_into().expect("header did not fit"),
            comment: creator_str,
            terminator: 0x1a,
            tracks
        }
    }
    fn get_track_mut(&mut self,cyl: usize,head: usize) -> Result<&mut Track,img::Error> {
        for trk in &mut self.tracks {
            if trk.cylinder as usize==cyl && (trk.head & HEAD_MASK) as usize==head {
                return Ok(trk);
            }
        }
        debug!("cannot find cyl {} head {}",cyl,head);
        Err(img::Error::TrackAccess)
    }
}

impl img::DiskImage for Imd {
    fn track_count(&self) -> usize {
        self.tracks.len()
    }
    fn byte_capacity(&self) -> usize {
        let mut ans = 0;
        for trk in &self.tracks {
            let mut idx = 0;
            let psec_size = img::SECTOR_SIZE << trk.sector_shift;
            for curr in &trk.sector_map {
                ans += match SectorData::from_u8(trk.track_buf[idx]) {
                    Some(SectorData::Normal) | Some(SectorData::NormalDeleted) => psec_size,
                    Some(SectorData::Error) | Some(SectorData::ErrorDeleted) => psec_size,
                    _ => {
                        debug!("cyl {} sector {} is marked unreadable, not counted",trk.cylinder,curr);
                        0
                    }
                };
                idx += trk.get_sec_buf_size(trk.track_buf[idx]);
            }
        }
        ans
    }
    fn kind(&self) -> img::DiskKind {
        self.kind
    }
    fn what_am_i(&self) -> img::DiskImageType {
        img::DiskImageType::IMD
    }
    fn file_extensions(&self) -> Vec<String> {
        file_extensions()
    }
    fn from_bytes(data: &[u8]) -> Result<Self,DYNERR> {
        if data.len()<29 {
            return Err(Box::new(img::Error::UnknownImageType));
        }
        let header = data[0..29].to_vec();
        match header[0..6] {
            [73,77,68,32,48,46] => info!("identified IMD v0.x header"),
            [73,77,68,32,49,46] => info!("identified IMD v1.x header"),
            [73,77,68,32,x,_y] => {
                warn!("IMD header found but with unknown major version {}",x as char);
                return Err(Box::new(img::Error::UnknownImageType));
            }
            _ => return Err(Box::new(img::Error::UnknownImageType))
        }
        let mut ptr = 0;
        for i in 29..data.len() {
            if data[i]==0x1a {
                ptr = i;
                break;
            }
        }
        if ptr==0 {
            warn!("IMD comment terminator is missing");
            return Err(Box::new(img::Error::UnknownImageType));
        }
        let comment = match String::from_utf8(data[29..ptr].to_vec()) {
            Ok(s) => s,
            Err(_) => {
                warn!("IMD comment is not unicode");
                return Err(Box::new(img::Error::UnknownImageType));
            }
        };
        let mut tracks: Vec<Track> = Vec::new();
        ptr += 1;
        while ptr<data.len() {
            let (compressed,len) = Track::from_bytes(&data[ptr..])?;
            if compressed.sector_shift!=0 {
                warn!("sector size {} is not valid on these disks",img::SECTOR_SIZE << compressed.sector_shift);
                return Err(Box::new(img::Error::ImageTypeMismatch));
            }
            if compressed.head & HEAD_MASK != 0 {
                warn!("second side found, these disks are one-sided");
                return Err(Box::new(img::Error::ImageTypeMismatch));
            }
            if (compressed.cylinder as usize) >= img::TRACKS {
                warn!("cylinder {} found, these disks have at most {} cylinders",compressed.cylinder,img::TRACKS);
                return Err(Box::new(img::Error::ImageTypeMismatch));
            }
            ptr += len;
            tracks.push(compressed.expand());
        }
        let kind = match tracks.iter().map(|t| t.sectors).max() {
            Some(26) => img::DiskKind::SingleDensity,
            Some(52) => img::DiskKind::DoubleDensity,
            Some(s) => {
                warn!("{} sectors per track does not match a known layout",s);
                return Err(Box::new(img::Error::ImageTypeMismatch));
            },
            None => {
                warn!("IMD image contains no tracks");
                return Err(Box::new(img::Error::ImageTypeMismatch));
            }
        };
        Ok(Self {
            kind,
            header: header.try_into().expect("unexpected header mismatch"),
            comment,
            terminator: 0x1a,
            tracks
        })
    }
    fn to_bytes(&mut self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        ans.append(&mut self.header.to_vec());
        ans.append(&mut self.comment.as_bytes().to_vec());
        ans.push(self.terminator);
        for trk in &self.tracks {
            let compressed = trk.compress();
            ans.append(&mut compressed.to_bytes());
        }
        return ans;
    }
    fn read_sector(&mut self,cyl: usize,head: usize,sec: usize) -> Result<Vec<u8>,DYNERR> {
        trace!("seeking sector {} (R)",sec);
        let trk = self.get_track_mut(cyl,head)?;
        let psec_size = img::SECTOR_SIZE << trk.sector_shift;
        for idx in 0..trk.sector_map.len() {
            if sec==trk.sector_map[idx] as usize {
                let off = trk.buf_offset(idx);
                return match SectorData::from_u8(trk.track_buf[off]) {
                    Some(SectorData::Normal) | Some(SectorData::NormalDeleted) => Ok(trk.track_buf[off+1..off+1+psec_size].to_vec()),
                    Some(SectorData::Error) | Some(SectorData::ErrorDeleted) => Ok(trk.track_buf[off+1..off+1+psec_size].to_vec()),
                    _ => {
                        debug!("cyl {} sector {}: data type {} not expected",cyl,sec,trk.track_buf[off]);
                        Err(Box::new(img::Error::SectorAccess))
                    }
                };
            }
        }
        error!("sector {} not found",sec);
        debug!("sector map {:?}",trk.sector_map);
        Err(Box::new(img::Error::SectorAccess))
    }
    fn write_sector(&mut self,cyl: usize,head: usize,sec: usize,dat: &[u8]) -> STDRESULT {
        trace!("seeking sector {} (W)",sec);
        let trk = self.get_track_mut(cyl,head)?;
        let psec_size = img::SECTOR_SIZE << trk.sector_shift;
        let padded = img::quantize_block(dat,psec_size);
        for idx in 0..trk.sector_map.len() {
            if sec==trk.sector_map[idx] as usize {
                let off = trk.buf_offset(idx);
                return match SectorData::from_u8(trk.track_buf[off]) {
                    Some(SectorData::Normal) | Some(SectorData::NormalDeleted) | Some(SectorData::Error) | Some(SectorData::ErrorDeleted) => {
                        trk.track_buf[off+1..off+1+psec_size].copy_from_slice(&padded);
                        Ok(())
                    },
                    _ => {
                        debug!("cyl {} sector {}: data type {} not expected",cyl,sec,trk.track_buf[off]);
                        Err(Box::new(img::Error::SectorAccess))
                    }
                };
            }
        }
        error!("sector {} not found",sec);
        Err(Box::new(img::Error::SectorAccess))
    }
}
