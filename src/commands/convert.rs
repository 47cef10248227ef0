use clap;
use std::str::FromStr;
use log::info;
use crate::img;
use crate::img::DiskImage;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

/// Copy every sector of the source image into a fresh image of the requested
/// type.  The file system is not interpreted, so this works on any disk of
/// the right geometry.
pub fn convert(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let dest = cmd.get_one::<String>("out").expect(RCH);
    let typ = img::DiskImageType::from_str(cmd.get_one::<String>("type").expect(RCH))?;
    let mut src = crate::create_img_from_file(img_path)?;
    let kind = src.kind();
    let mut ans: Box<dyn DiskImage> = match typ {
        img::DiskImageType::RAW => Box::new(img::raw::Raw::create(kind)),
        img::DiskImageType::IMD => Box::new(img::imd::Imd::create(kind))
    };
    for cyl in 0..img::TRACKS {
        for sec in 1..kind.sectors()+1 {
            let dat = src.read_sector(cyl,0,sec)?;
            ans.write_sector(cyl,0,sec,&dat)?;
        }
    }
    info!("copied {} sectors",img::TRACKS*kind.sectors());
    std::fs::write(dest,ans.to_bytes())?;
    Ok(())
}
