#[allow(clippy::module_inception)]
mod cli;

pub use self::cli::Args;
