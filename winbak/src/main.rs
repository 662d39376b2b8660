mod application;
mod presentation;

use std::process::ExitCode;

fn main() -> ExitCode {
    match application::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("winbak: {e}");
            ExitCode::FAILURE
        }
    }
}
