//! Main application entry point.

use clap::Parser;
use printcanvas_app::{App, AppConfig, Cli};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("Starting PrintCanvas: {:?}", cli.command);

    let app = App::with_config(AppConfig::from_cli(&cli));
    match pollster::block_on(app.run(cli.command)) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
