use std::process::ExitCode;

fn main() -> ExitCode {
    rexchat_cli::run()
}
