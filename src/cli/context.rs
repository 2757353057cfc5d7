use std::path::{Path, PathBuf};

use pagemirror_cli::Config;

use super::output::OutputFormat;

pub struct CliContext {
    config: Config,
    config_path: PathBuf,
    from_file: bool,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        from_file: bool,
        output: OutputFormat,
    ) -> Self {
        Self {
            config,
            config_path,
            from_file,
            output,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Whether the configuration came from a file rather than defaults.
    pub fn from_file(&self) -> bool {
        self.from_file
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
