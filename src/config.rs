use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// Directory receiving the per-source CSV logs and summary.json.
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    /// Also dump the exact rows found this run as JSON under `<dir>/dev`.
    #[serde(default)]
    pub dev_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
            dev_json: false,
        }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    /// Watermark state file (JSON mapping source → last collected timestamp).
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".history_collect_state.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Per-source collection timeout. A source that exceeds it is treated as
    /// failed for this run; the others continue.
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
    /// Size of the collector worker pool.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: default_source_timeout(),
            max_parallel: default_max_parallel(),
        }
    }
}

fn default_source_timeout() -> u64 {
    30
}

fn default_max_parallel() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub firefox: SourceConfig,
    #[serde(default)]
    pub chrome: SourceConfig,
    #[serde(default)]
    pub edge: SourceConfig,
    #[serde(default)]
    pub safari: SourceConfig,
}

/// Per-backend probe overrides.
///
/// `roots` replaces the OS defaults when set. For firefox, chrome, and edge
/// the entries are directories whose children are profile directories; for
/// safari they are candidate `History.db` file paths.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceConfig {
    pub roots: Option<Vec<PathBuf>>,
}

/// Load configuration from `path`. An absent file yields full defaults, so
/// the tool runs with no configuration at all.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.run.max_parallel == 0 {
        anyhow::bail!("run.max_parallel must be >= 1");
    }
    if config.run.source_timeout_secs == 0 {
        anyhow::bail!("run.source_timeout_secs must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("hist.toml")).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.run.max_parallel, 4);
        assert_eq!(config.run.source_timeout_secs, 30);
        assert!(config.sources.firefox.roots.is_none());
    }

    #[test]
    fn parses_overrides() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hist.toml");
        std::fs::write(
            &path,
            r#"
[output]
dir = "/tmp/hh-out"
dev_json = true

[run]
source_timeout_secs = 5
max_parallel = 2

[sources.firefox]
roots = ["/tmp/profiles"]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/tmp/hh-out"));
        assert!(config.output.dev_json);
        assert_eq!(config.run.max_parallel, 2);
        assert_eq!(
            config.sources.firefox.roots,
            Some(vec![PathBuf::from("/tmp/profiles")])
        );
        // Untouched sections keep their defaults.
        assert!(config.sources.safari.roots.is_none());
    }

    #[test]
    fn rejects_zero_pool() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hist.toml");
        std::fs::write(&path, "[run]\nmax_parallel = 0\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
