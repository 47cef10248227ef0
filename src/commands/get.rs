use clap;
use std::io::Write;
use log::error;
use super::CommandError;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

fn output_get(object: Vec<u8>) -> STDRESULT {
    if atty::is(atty::Stream::Stdout) {
        crate::display_block(0,&object);
    } else {
        std::io::stdout().write_all(&object).expect("could not write stdout");
    }
    Ok(())
}

/// Parse a `cyl,head,sec` address
fn parse_sector_address(farg: &str) -> Result<[usize;3],CommandError> {
    let fcopy = String::from(farg);
    let it: Vec<&str> = fcopy.split(',').collect();
    if it.len()!=3 {
        error!("sector address format is `cyl,head,sec`");
        return Err(CommandError::OutOfRange);
    }
    let mut ans = [0;3];
    for i in 0..3 {
        ans[i] = match usize::from_str_radix(it[i],10) {
            Ok(x) => x,
            Err(_) => {
                error!("sector address component `{}` is not a number",it[i]);
                return Err(CommandError::OutOfRange);
            }
        };
    }
    Ok(ans)
}

pub fn get(cmd: &clap::ArgMatches) -> STDRESULT {
    let src_path = cmd.get_one::<String>("file").expect(RCH);
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    match cmd.get_one::<String>("type").expect(RCH).as_str() {
        "sec" => {
            let [cyl,head,sec] = parse_sector_address(src_path)?;
            let mut img = crate::create_img_from_file(img_path)?;
            output_get(img.read_sector(cyl,head,sec)?)
        },
        "raw" => {
            let mut disk = crate::create_fs_from_file(img_path)?;
            output_get(disk.read_file(src_path)?)
        },
        _ => Err(Box::new(CommandError::InvalidCommand))
    }
}
