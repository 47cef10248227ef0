use clap_complete::shells;
use crate::STDRESULT;

pub fn generate(mut main_cmd: clap::Command,cmd: &clap::ArgMatches) -> STDRESULT {
    match cmd.get_one::<String>("shell").unwrap().as_str() {
        "bash" => clap_complete::generate(shells::Bash,&mut main_cmd,"isiskit",&mut std::io::stdout()),
        "elv" => clap_complete::generate(shells::Elvish,&mut main_cmd,"isiskit",&mut std::io::stdout()),
        "fish" => clap_complete::generate(shells::Fish,&mut main_cmd,"isiskit",&mut std::io::stdout()),
        "ps1" => clap_complete::generate(shells::PowerShell,&mut main_cmd,"isiskit",&mut std::io::stdout()),
        "zsh" => clap_complete::generate(shells::Zsh,&mut main_cmd,"isiskit",&mut std::io::stdout()),
        _ => panic!("unexpected shell")
    }
    Ok(())
}
