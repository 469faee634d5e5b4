use anyhow::Result;

mod args;
mod exit_status;
mod report;
mod run;

pub use self::args::{Arguments, Command};
pub use self::exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    run::run(args)
}
