#![warn(missing_docs)]

//! release-email writes the e-mail announcing a deployment.
//! It logs the commits since the last good CI build, reads the labels at the
//! start of their messages and looks up the tasks those labels point to.
//! ```
//! # use release_email::labels;
//! let message = "(md:1864 wip) Fix the release script";
//!
//! let labels = labels::parse(message); // Gets the labels
//! assert_eq!(labels.get("md"), Some("1864"));
//!
//! let message = labels::strip(message); // Gets the message without labels
//! assert_eq!(message, "Fix the release script");
//! ```

/// The labels module parses the labels embedded in commit messages.
pub mod labels;

/// The changelog module is for commit entries and what is derived from them,
/// like [`changelog::contributors`].
pub mod changelog;

/// The api module holds the clients of the services the e-mail draws on.
pub mod api;

/// The email module renders the [`email::ReleaseEmail`].
pub mod email;

/// Command line arguments.
pub mod cli;

/// The macro module is for the macros included in this library. This includes
/// the [`macros::ok_or_continue`] macro.
pub mod macros;

mod repo;

pub use crate::repo::{git_log_args, Repo};


const GIT_FOLDERNAME: &'static str = ".git";
