//! dvpn-cli: command-line client for the dVPN query layer.
//!
//! Every subcommand maps to one operation of [`dvpn_query::VpnQueryApi`].
//! Records print to stdout as pretty JSON; logs go to stderr.
//!
//! | Outcome | Exit code |
//! |---------|-----------|
//! | Record found | 0 |
//! | Chain rejected the transaction, or any other failure | 1 |
//! | Nothing at that identifier | 2 |

pub mod cli;
pub mod commands;

pub use cli::{Args, Command};
pub use commands::{execute, Outcome};
