//! Drawbridge CLI - Convert symbolic diagrams to draw.io files

mod cli;

use clap::Parser;
use drawbridge::DiagramError;

fn main() {
    let cli_args = cli::Cli::parse();

    // Logging is initialized inside run() once the flags are known
    let app = cli::DrawbridgeApp::new();

    if let Err(e) = app.run(cli_args) {
        let user_error = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<DiagramError>())
            .filter(|err| err.is_user_error());
        match user_error {
            Some(err) => eprintln!("Error: {}", err),
            None => eprintln!("Error: {:?}", e),
        }
        std::process::exit(1);
    }
}
