use crate::config::toml_config::SanctuaryConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "zoo-sanctuary")]
#[command(about = "Animal, keeper and habitat registry for a wildlife sanctuary")]
pub struct CliArgs {
    /// TOML configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "sanctuary.toml")]
    pub config: PathBuf,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Overrides `server.port`
    #[arg(long)]
    pub port: Option<u16>,

    /// Overrides `database.path`
    #[arg(long)]
    pub database: Option<String>,
}

impl CliArgs {
    /// Command-line flags win over file values.
    pub fn apply_overrides(&self, config: &mut SanctuaryConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(database) = &self.database {
            config.database.path = database.clone();
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["zoo-sanctuary"]);
        assert_eq!(args.config, PathBuf::from("sanctuary.toml"));
        assert!(!args.verbose);
        assert!(args.port.is_none());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let args = CliArgs::parse_from([
            "zoo-sanctuary",
            "--port",
            "9100",
            "--database",
            "/tmp/zoo.db",
            "-v",
        ]);
        let mut config = SanctuaryConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.path, "/tmp/zoo.db");
        assert_eq!(config.logging.level, "debug");
    }
}
