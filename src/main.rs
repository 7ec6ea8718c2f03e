use std::process::ExitCode;

fn main() -> ExitCode {
    match tou_stats_exporter::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
