use crate::config::AppConfig;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "halla-bob")]
#[command(about = "Halla University cafeteria menu crawler and API server")]
pub struct Cli {
    /// Path to TOML configuration file (defaults are used when it is missing)
    #[arg(short, long, global = true, default_value = "halla-bob.toml")]
    pub config: String,

    /// Override storage.database_path
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the menu API and run the weekly crawl
    Serve {
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,

        /// Do not register the weekly crawl
        #[arg(long)]
        no_schedule: bool,
    },
    /// Crawl once, save, and print a preview of the stored menus
    Crawl {
        /// Override source.url
        #[arg(long)]
        url: Option<String>,

        /// Print extracted menus without saving them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print stored menus
    Show {
        /// Only this day (YYYY.MM.DD)
        #[arg(long)]
        date: Option<String>,
    },
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(database) = &self.database {
            config.storage.database_path = database.clone();
        }
        match &self.command {
            Command::Serve { port, no_schedule } => {
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if *no_schedule {
                    config.schedule.enabled = false;
                }
            }
            Command::Crawl { url: Some(url), .. } => {
                config.source.url = url.clone();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "halla-bob",
            "serve",
            "--port",
            "9100",
            "--no-schedule",
            "--database",
            "/tmp/menus.db",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.server.port, 9100);
        assert!(!config.schedule.enabled);
        assert_eq!(config.storage.database_path, "/tmp/menus.db");
    }

    #[test]
    fn test_crawl_url_override() {
        let cli = Cli::try_parse_from([
            "halla-bob",
            "-v",
            "crawl",
            "--url",
            "http://localhost:9000/menu",
            "--dry-run",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Crawl { dry_run: true, .. }));
        assert_eq!(config.source.url, "http://localhost:9000/menu");
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["halla-bob"]).is_err());
    }
}
