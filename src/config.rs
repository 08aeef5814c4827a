// Command-line flags, each with an environment fallback.
use crate::loader::DEFAULT_DATA_PATH;
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "claims_dashboard", version, about = "Auto insurance fraud dashboard")]
pub struct Cli {
    /// Claims CSV to load at startup.
    #[arg(long, env = "DASHBOARD_DATA", default_value = DEFAULT_DATA_PATH, global = true)]
    pub data: PathBuf,

    #[arg(long, env = "DASHBOARD_HOST", default_value = "127.0.0.1", global = true)]
    pub host: IpAddr,

    #[arg(long, env = "DASHBOARD_PORT", default_value_t = 5000, global = true)]
    pub port: u16,

    /// Verbose logging and a fresh dataset read on every request.
    #[arg(long, env = "DASHBOARD_DEBUG", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the dashboard over HTTP (the default).
    Serve,
    /// Print the cards and chart tables to the console.
    Summary {
        /// Also write the summary as pretty JSON to this path.
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "claims_dashboard=debug,info"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serve_on_localhost_5000() {
        let cli = Cli::try_parse_from(["claims_dashboard"]).unwrap();
        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.addr().to_string(), "127.0.0.1:5000");
        assert_eq!(cli.data, PathBuf::from(DEFAULT_DATA_PATH));
        assert!(!cli.debug);
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn summary_takes_json_path_and_global_flags() {
        let cli = Cli::try_parse_from([
            "claims_dashboard",
            "summary",
            "--json",
            "out.json",
            "--data",
            "claims.csv",
            "--debug",
        ])
        .unwrap();
        assert_eq!(
            cli.command(),
            Command::Summary {
                json: Some(PathBuf::from("out.json"))
            }
        );
        assert_eq!(cli.data, PathBuf::from("claims.csv"));
        assert!(cli.debug);
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Cli::try_parse_from(["claims_dashboard", "--port", "99999"]).is_err());
    }
}
