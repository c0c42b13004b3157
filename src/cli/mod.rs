//! CLI Module
//!
//! Exit codes and output formatting shared by the command-line tools.

pub mod exit_codes;
pub mod output;

pub use exit_codes::{exit_code_description, print_exit_codes, CliResult, ExitCodes};
pub use output::{format_command_list, format_request, OutputFormat};
