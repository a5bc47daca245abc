use markfarm::cli::{Cli, Output};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };
    let output = Output::new(cli.verbose > 0, cli.quiet);

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
