//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::id::SubmissionId;

/// reviewbot: claims review submissions for the projects you are certified in.
///
/// Configuration lives in a JSON file holding your token and certifications.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config file path (default: the user config dir)
    #[arg(short, long, env = "REVIEWBOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write every API response body to ./reviewbot-responses
    #[arg(long, global = true)]
    pub debug_responses: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Set the token
    Token { token: String },

    /// Show project certifications
    Certs {
        /// Refresh the certifications from the API
        #[arg(short, long)]
        update: bool,
    },

    /// Show the submissions currently assigned to you
    Assigned {
        /// Open each submission's review page in the browser
        #[arg(long)]
        open: bool,
    },

    /// Try once to claim a submission for every certification
    Review,

    /// Claim every <SECONDS> seconds with every configured token until interrupted
    #[command(name = "req-with-cert", alias = "reqWithCert")]
    ReqWithCert { seconds: u64 },

    /// Release a claimed submission
    Unassign { submission_id: SubmissionId },

    /// List every submission you have reviewed or hold
    Submissions,

    /// List completed reviews
    Completed,

    /// Show the feedback students left on your reviews
    Feedbacks,

    /// Show student feedback statistics
    Stats,

    /// Manage the extra tokens used by req-with-cert
    Tokens {
        #[command(subcommand)]
        action: TokensAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum TokensAction {
    List,
    Add { token: String },
    Remove { token: String },
}
