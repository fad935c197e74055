use std::process::ExitCode;

use tracing::error;

mod app;

fn main() -> ExitCode {
    let (wiring, _log_guard) = app::bootstrap::build_app();
    match wiring.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
