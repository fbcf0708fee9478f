//! One module per subcommand, each exposing an `execute` function.

pub mod add;
pub mod completions;
pub mod config;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;
pub mod version;
