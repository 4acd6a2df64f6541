//! Command-line arguments.

use clap::Parser;

/// Watch a ranging sensor and email a camera frame when something comes close.
#[derive(Debug, Clone, Parser)]
#[command(name = "proxwatch", version, about)]
pub struct Cli {
    /// Address that receives alerts
    pub email: String,

    /// Sender address, also used as the SMTP login
    pub sender: String,

    /// SMTP credential for the sender account
    pub password: String,

    /// Trigger distance threshold in centimeters
    #[arg(long, value_name = "CM")]
    pub threshold: Option<f64>,

    /// Seconds between distance polls
    #[arg(long, value_name = "SECS")]
    pub scan: Option<f64>,

    /// Minimum seconds between two alerts
    #[arg(long, value_name = "SECS")]
    pub cooldown: Option<f64>,
}
