use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Location of the configuration file
    #[clap(long, env = "TASK_GEN_CONFIG", default_value = DEFAULT_CONFIG_PATH, hide = true)]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_override() {
        let args = Args::try_parse_from(["task-gen", "--config", "/tmp/jira.conf"]).unwrap();
        assert_eq!(args.config, PathBuf::from("/tmp/jira.conf"));
    }

    #[test]
    fn test_rejects_unknown_flags() {
        assert!(Args::try_parse_from(["task-gen", "--dry-run"]).is_err());
    }
}
