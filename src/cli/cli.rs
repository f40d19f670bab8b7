use clap::{
    ArgAction,
    Parser,
};
use log::LevelFilter;

use crate::api::manoderecha::API_BASE;

/// Writes the release e-mail for the commits deployed since the last good build
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Url of the Jenkins server
    pub ci_url: String,

    /// Live url of the project
    pub project_url: String,

    /// The Jenkins job that deploys the project
    pub job_name: String,

    /// The path to the repo
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Url of the remote repo, used to link commits
    #[arg(short, long, default_value=None)]
    pub remote_url: Option<String>,

    /// Leave out commits carrying this label (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,

    /// Label holding manoderecha task ids
    #[arg(short, long, default_value = "md")]
    pub task_label: String,

    /// Label holding JIRA issue keys
    #[arg(long, default_value = "jira")]
    pub issue_label: String,

    /// Log since this revision instead of the last good build
    #[arg(long, default_value=None)]
    pub since: Option<String>,

    /// The file to write the output to
    #[arg(short, long, default_value=None)]
    pub outfile: Option<String>,

    /// Write the release data as JSON instead of the e-mail
    #[arg(long)]
    pub json: bool,

    /// More logging, may be repeated
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Manoderecha user
    #[arg(long, env = "MANODERECHA_USER")]
    pub manoderecha_user: Option<String>,

    /// Manoderecha password
    #[arg(long, env = "MANODERECHA_PASSWORD", hide_env_values = true)]
    pub manoderecha_password: Option<String>,

    /// Manoderecha API base url
    #[arg(long, env = "MANODERECHA_URL", default_value = API_BASE)]
    pub manoderecha_url: String,

    /// JIRA REST API base url, enables issue lookup
    #[arg(long, env = "JIRA_URL")]
    pub jira_url: Option<String>,

    /// JIRA user
    #[arg(long, env = "JIRA_USER")]
    pub jira_user: Option<String>,

    /// JIRA password
    #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true)]
    pub jira_password: Option<String>,
}

impl Args {
    /// Log level for the number of `-v` flags.
    pub fn log_level(&self) -> LevelFilter {
        return match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
    }
}
