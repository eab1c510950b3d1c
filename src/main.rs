use cat_detector::cli::{self, Args, Command, Settings};
use cat_detector::config::{default_path, Config};
use clap::Parser;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config_path = args.config.clone().unwrap_or_else(default_path);
    let config = match Config::load(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let settings = match Settings::resolve(&args, &config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let code = match args.command {
        None | Some(Command::Run) => cli::run_detector(&settings),
        Some(Command::Check) => cli::check(&settings),
        Some(Command::Config { action }) => {
            cli::handle_config_action(action, &settings, &config_path)
        }
    };

    std::process::exit(code);
}
