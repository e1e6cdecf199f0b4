use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(helios_distro::run())
}
