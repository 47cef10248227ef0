//! # Command Line Interface
//!
//! Simple subcommands are directly in `main.rs`.
//! More elaborate subcommands are in the `commands` module.
//! The command tree itself is defined in `cli.rs`.

use env_logger;
use log::error;
use isiskit::cli;
use isiskit::commands;
use isiskit::commands::CommandError;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let main_cmd = cli::build_cli();
    let matches = main_cmd.get_matches();

    // Catalog a disk image
    if let Some(cmd) = matches.subcommand_matches("catalog") {
        if let Some(path_to_img) = cmd.get_one::<String>("dimg") {
            return match isiskit::create_fs_from_file(path_to_img) {
                Ok(mut disk) => disk.catalog_to_stdout(),
                Err(e) => Err(e)
            };
        }
    }

    // Extract files from a disk image
    if let Some(cmd) = matches.subcommand_matches("unpack") {
        return commands::unpack::unpack(cmd);
    }

    // Get file or sector from inside a disk image
    if let Some(cmd) = matches.subcommand_matches("get") {
        return commands::get::get(cmd);
    }

    // Convert between image types
    if let Some(cmd) = matches.subcommand_matches("convert") {
        return commands::convert::convert(cmd);
    }

    // List records in a record stream
    if let Some(cmd) = matches.subcommand_matches("objdump") {
        return commands::dump::objdump(cmd);
    }

    // Generate shell completions
    if let Some(cmd) = matches.subcommand_matches("completions") {
        return commands::completions::generate(cli::build_cli(),cmd);
    }

    error!("No subcommand was found, try `isiskit --help`");
    return Err(Box::new(CommandError::InvalidCommand));
}
