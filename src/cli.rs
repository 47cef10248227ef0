use clap::{arg,crate_version,Arg,Command,ValueHint};

const SEC_HELP: &str = "sector addresses are given as `cyl,head,sec`,
e.g., `1,0,1` is the first directory link block";

fn dimg_arg(req: bool) -> Arg {
    Arg::new("dimg").short('d').long("dimg").help("path to disk image itself")
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .required(req)
}

pub fn build_cli() -> Command {
    let long_help = "isiskit reads Intel ISIS-II disk images and is always invoked with
exactly one of several subcommands.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
list the directory:    `isiskit catalog -d system.imd`
extract all files:     `isiskit unpack -d system.imd -o dumpdir`
extract some files:    `isiskit unpack -d system.imd -o dumpdir -g '*.csd'`
file to stdout:        `isiskit get -f isis.bin -d system.imd > isis.bin`
convert to raw:        `isiskit convert -d system.imd -t bin -o system.bin`
decode a system image: `isiskit get -f isis.bin -d system.imd | isiskit objdump -t sys`";

    let img_types = ["bin","imd"];
    let obj_types = ["sys","omf"];
    let get_types = ["raw","sec"];

    let mut main_cmd = Command::new("isiskit")
        .about("Intel ISIS-II disk images and files.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(Command::new("catalog")
        .arg(dimg_arg(true))
        .about("write disk image directory to stdout"));
    main_cmd = main_cmd.subcommand(Command::new("unpack")
        .arg(dimg_arg(true))
        .arg(arg!(-o --out <PATH> "destination directory, created if absent").required(true)
            .value_hint(ValueHint::DirPath))
        .arg(arg!(-g --glob <PATTERN> "only extract matching file names").required(false))
        .about("extract files from a disk image"));
    main_cmd = main_cmd.subcommand(Command::new("get")
        .arg(arg!(-f --file <PATH> "name of file, or sector address, inside disk image").required(true)
            .long_help(SEC_HELP))
        .arg(arg!(-t --type <TYPE> "type of the item").required(false).value_parser(get_types)
            .default_value("raw"))
        .arg(dimg_arg(true))
        .about("read from disk image, write to stdout"));
    main_cmd = main_cmd.subcommand(Command::new("convert")
        .arg(dimg_arg(true))
        .arg(arg!(-t --type <TYPE> "type of disk image to create").required(true).value_parser(img_types))
        .arg(arg!(-o --out <PATH> "disk image path to create").required(true)
            .value_hint(ValueHint::FilePath))
        .about("convert between disk image types"));
    main_cmd = main_cmd.subcommand(Command::new("objdump")
        .arg(arg!(-f --file <PATH> "path to local file, omit to read stdin").required(false)
            .value_hint(ValueHint::FilePath))
        .arg(arg!(-t --type <TYPE> "type of the record stream").required(true).value_parser(obj_types))
        .arg(arg!(-o --out <PATH> "also write flattened memory image here (sys only)").required(false)
            .value_hint(ValueHint::FilePath))
        .about("list records in a system image or object module"));
    main_cmd = main_cmd.subcommand(Command::new("completions")
        .arg(arg!(-s --shell <SHELL> "shell to receive completions").required(true)
            .value_parser(["bash","elv","fish","ps1","zsh"]))
        .about("write completions script to stdout"));

    main_cmd
}
