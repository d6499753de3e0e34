use clap::{ArgAction, Parser};
use std::path::PathBuf;

const DEFAULT_DBNAME: &str = "sensors";

#[derive(Parser, Debug)]
#[command(
    name = "tcxexport",
    about = "Export one user's accelerometer and GPS readings for one day as a TCX file"
)]
pub struct Cli {
    /// Database host
    pub dbhost: String,

    /// Database port
    pub dbport: u16,

    /// Database login
    pub dbuser: String,

    /// User whose readings are exported (their schema in the database)
    pub user: String,

    /// Day to export, exactly as stored in the `day` column
    pub date: String,

    /// Where to write the TCX document
    pub outfile: PathBuf,

    /// Database name
    #[arg(long, default_value = DEFAULT_DBNAME)]
    pub dbname: String,

    /// Database password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read from a SQLite snapshot instead of connecting.
    ///
    /// DBHOST, DBPORT and DBUSER are ignored when this is set.
    #[arg(long, value_name = "FILE")]
    pub sqlite: Option<PathBuf>,

    /// Indent the XML output
    #[arg(long)]
    pub pretty: bool,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}
