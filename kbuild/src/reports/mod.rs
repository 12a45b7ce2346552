//! Report data structures for commands.
//!
//! Operations build reports, then commands render them to an Output target.

mod build;
mod check;
mod options;
mod output;

pub use check::CheckReport;
pub use options::{OptionInfo, OptionsReport};
pub use output::{Report, TerminalOutput};
