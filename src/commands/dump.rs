use clap;
use std::io::Read;
use log::error;
use crate::obj;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

/// List the records in a system image or object module; for system images
/// optionally write the flattened memory image to a file.
pub fn objdump(cmd: &clap::ArgMatches) -> STDRESULT {
    let dat = match cmd.get_one::<String>("file") {
        Some(src_path) => std::fs::read(src_path)?,
        None => {
            if atty::is(atty::Stream::Stdin) {
                error!("line entry is not supported for `objdump`, please pipe something in");
                return Err(Box::new(super::CommandError::InvalidCommand));
            }
            let mut buf: Vec<u8> = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    match cmd.get_one::<String>("type").expect(RCH).as_str() {
        "sys" => {
            let sys = obj::sysimage::SystemImage::parse(&dat)?;
            sys.list_to_stdout();
            if let Some(out) = cmd.get_one::<String>("out") {
                std::fs::write(out,sys.flatten())?;
            }
            Ok(())
        },
        "omf" => obj::omf::dump_to_stdout(&dat),
        _ => Err(Box::new(super::CommandError::InvalidCommand))
    }
}
