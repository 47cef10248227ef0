//! ## Support for raw sector dumps
//!
//! These images are a simple sequential dump of the already-decoded sector
//! data, track by track.  Alternative extensions include BIN, IMG, and DSK.
//! The byte count determines the recording layout: there is no header, so any
//! other length has to be rejected as unrecognized.

use log::{info,error};
use crate::img;
use crate::{STDRESULT,DYNERR};

pub fn file_extensions() -> Vec<String> {
    vec!["bin".to_string(),"img".to_string(),"dsk".to_string()]
}

/// Wrapper for raw image data.
pub struct Raw {
    kind: img::DiskKind,
    sectors: usize,
    data: Vec<u8>
}

impl Raw {
    /// Create a blank image of the given kind
    pub fn create(kind: img::DiskKind) -> Self {
        Self {
            kind,
            sectors: kind.sectors(),
            data: vec![0;kind.byte_capacity()]
        }
    }
    fn check_coords(&self,cyl: usize,head: usize,sec: usize) -> STDRESULT {
        if cyl >= img::TRACKS || head > 0 {
            error!("track {} head {} out of range",cyl,head);
            return Err(Box::new(img::Error::TrackAccess));
        }
        if sec < 1 || sec > self.sectors {
            error!("sector {} out of range, should be 1-{}",sec,self.sectors);
            return Err(Box::new(img::Error::SectorAccess));
        }
        Ok(())
    }
}

impl img::DiskImage for Raw {
    fn track_count(&self) -> usize {
        img::TRACKS
    }
    fn byte_capacity(&self) -> usize {
        self.data.len()
    }
    fn kind(&self) -> img::DiskKind {
        self.kind
    }
    fn what_am_i(&self) -> img::DiskImageType {
        img::DiskImageType::RAW
    }
    fn file_extensions(&self) -> Vec<String> {
        file_extensions()
    }
    fn from_bytes(data: &[u8]) -> Result<Self,DYNERR> {
        let kind = match data.len() {
            l if l==img::DiskKind::SingleDensity.byte_capacity() => img::DiskKind::SingleDensity,
            l if l==img::DiskKind::DoubleDensity.byte_capacity() => img::DiskKind::DoubleDensity,
            l => {
                info!("image size was {}",l);
                return Err(Box::new(img::Error::ImageSizeMismatch));
            }
        };
        info!("raw image size matches {}",kind);
        Ok(Self {
            kind,
            sectors: kind.sectors(),
            data: data.to_vec()
        })
    }
    fn to_bytes(&mut self) -> Vec<u8> {
        return self.data.clone();
    }
    fn read_sector(&mut self,cyl: usize,head: usize,sec: usize) -> Result<Vec<u8>,DYNERR> {
        self.check_coords(cyl,head,sec)?;
        let offset = (cyl*self.sectors + sec - 1)*img::SECTOR_SIZE;
        Ok(self.data[offset..offset+img::SECTOR_SIZE].to_vec())
    }
    fn write_sector(&mut self,cyl: usize,head: usize,sec: usize,dat: &[u8]) -> STDRESULT {
        self.check_coords(cyl,head,sec)?;
        let offset = (cyl*self.sectors + sec - 1)*img::SECTOR_SIZE;
        let padded = img::quantize_block(dat,img::SECTOR_SIZE);
        self.data[offset..offset+img::SECTOR_SIZE].copy_from_slice(&padded);
        Ok(())
    }
}
