//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Prepdesk session client.
#[derive(Parser, Debug)]
#[command(name = "prepdesk", version, about)]
pub struct Cli {
    /// Settings file to use instead of the default one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overriding the settings.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session.
    Login {
        /// Email or username.
        #[arg(long)]
        identifier: String,
        #[arg(long, env = "PREPDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account. It must be verified by email before login.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PREPDESK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out and clear the stored session.
    Logout,
    /// Print the stored session.
    Whoami,
    /// Fetch the profile and update the cached user.
    Profile,
    /// Authenticated GET against the API, printing the body.
    Get {
        /// Path relative to the base URL, e.g. `/courses`.
        path: String,
    },
    /// Check an order after checkout.
    VerifyPayment {
        order_id: String,
    },
}
