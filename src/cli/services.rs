//! Services subcommand implementation.

use crate::error::CliResult;
use crate::output;
use clap::Parser;

/// List well-known ports and their service names.
#[derive(Parser, Debug)]
pub struct ServicesCommand {}

impl ServicesCommand {
    pub fn execute(&self) -> CliResult<()> {
        output::print_services()?;
        Ok(())
    }
}
