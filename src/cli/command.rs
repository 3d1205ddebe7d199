use std::path::PathBuf;

pub enum Command {
    /// Summarize a metadata index file per category.
    Inspect { index: PathBuf },
    /// Load and validate a TOML configuration, then show the resolved settings.
    CheckConfig { config: PathBuf },
    /// Print the built-in default configuration as TOML.
    Defaults,
}
