use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "session-server", about = "Session token authentication service")]
pub struct Opt {
    /// Config file path
    #[arg(short, long, value_parser, default_value = "config.toml")]
    pub config: clio::Input,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Hosts the service (default)
    Serve,
    /// Creates a new session and prints its bearer token
    Create,
    /// Validates a bearer token and prints the session it authenticates
    Validate { token: String },
    /// Revokes the session with the given id
    Revoke { id: String },
    /// Deletes all expired sessions
    Purge,
}
