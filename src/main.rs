use std::process::ExitCode;

use json_valgen::cli;

fn main() -> anyhow::Result<ExitCode> {
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.init_logging();
    command_line_interface.run()
}
