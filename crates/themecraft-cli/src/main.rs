use clap::Parser;
use themecraft_cli::Cli;
use themecraft_cli::commands::run;

fn main() {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(error) = run(&cli.command) {
        log::error!("{error}");
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
