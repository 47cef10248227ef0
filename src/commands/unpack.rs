use clap;
use std::path::Path;
use log::{info,warn};
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

/// Write every active file (optionally filtered by a glob pattern against
/// the displayed name) into the destination directory.
pub fn unpack(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let dest = cmd.get_one::<String>("out").expect(RCH);
    let mut disk = crate::create_fs_from_file(img_path)?;
    let wanted: Option<Vec<String>> = match cmd.get_one::<String>("glob") {
        Some(pattern) => Some(disk.glob(pattern)?),
        None => None
    };
    std::fs::create_dir_all(dest)?;
    let mut count = 0;
    for entry in disk.get_directory()? {
        let filename = entry.filename();
        if let Some(names) = &wanted {
            if !names.contains(&filename) {
                continue;
            }
        }
        let dat = disk.extract_file(&entry)?;
        std::fs::write(Path::new(dest).join(&filename),&dat)?;
        info!("unpacked {} ({} bytes)",filename,dat.len());
        count += 1;
    }
    if count==0 {
        warn!("nothing was extracted");
    }
    Ok(())
}
