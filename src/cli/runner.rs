use crate::cache::{CacheConfig, Category, MetadataIndex};
use crate::errors::CacheError;
use std::io::Write;

use super::command::Command;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

pub fn run(cmd: Command) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    run_with_format(cmd, OutputMode::Human, &mut stdout.lock())
}

pub fn run_with_format(
    cmd: Command,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Inspect { index } => {
            let Some(loaded) = MetadataIndex::load(&index)? else {
                return Err(Box::new(CacheError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no index at {}", index.display()),
                ))));
            };
            let summary = loaded.summary();
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "path": index.display().to_string(),
                        "entries": loaded.len(),
                        "categories": summary,
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => {
                    for s in &summary {
                        writeln!(out, "{} {} {} {}", s.category, s.entries, s.size_bytes, s.hot)?;
                    }
                }
                OutputMode::Human => {
                    writeln!(out, "index={} entries={}", index.display(), loaded.len())?;
                    for s in &summary {
                        writeln!(
                            out,
                            "  {:<16} entries={:<6} bytes={:<12} hot={}",
                            s.category, s.entries, s.size_bytes, s.hot
                        )?;
                    }
                }
            }
            Ok(())
        }
        Command::CheckConfig { config } => {
            let cfg = CacheConfig::load(&config)?;
            let resolved: Vec<(Category, _)> = Category::ALL.into_iter().map(|c| (c, cfg.resolve(c))).collect();
            match mode {
                OutputMode::Json => {
                    let categories: serde_json::Map<String, serde_json::Value> = resolved
                        .iter()
                        .map(|(c, s)| Ok((c.to_string(), serde_json::to_value(s)?)))
                        .collect::<Result<_, serde_json::Error>>()?;
                    let json = serde_json::json!({
                        "valid": true,
                        "max_size_bytes": cfg.max_size_bytes,
                        "max_entry_bytes": cfg.max_entry_bytes(),
                        "index_path": cfg.index_path().display().to_string(),
                        "categories": categories,
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => {
                    for (c, s) in &resolved {
                        writeln!(out, "{c} {} {:?}", s.max_size_bytes, s.retention_policy)?;
                    }
                }
                OutputMode::Human => {
                    writeln!(
                        out,
                        "valid max_size_bytes={} max_entry_bytes={} index={}",
                        cfg.max_size_bytes,
                        cfg.max_entry_bytes(),
                        cfg.index_path().display()
                    )?;
                    for (c, s) in &resolved {
                        writeln!(
                            out,
                            "  {:<16} max_bytes={:<12} policy={:<5} protection={} hot_threshold={} hot_ttl={}s cold_ttl={}s",
                            c.as_str(),
                            s.max_size_bytes,
                            format!("{:?}", s.retention_policy).to_lowercase(),
                            s.protection_enabled,
                            s.hot_threshold,
                            s.hot_ttl.as_secs(),
                            s.cold_ttl.as_secs()
                        )?;
                    }
                }
            }
            Ok(())
        }
        Command::Defaults => {
            let cfg = CacheConfig::default();
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(&cfg)?)?,
                _ => write!(out, "{}", toml::to_string_pretty(&cfg)?)?,
            }
            Ok(())
        }
    }
}
