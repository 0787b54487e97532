use std::process::ExitCode;

use moe::ui::output;

fn main() -> ExitCode {
    match moe::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
