use release_announcer::{cli, logger, ui};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logger::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli::main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
