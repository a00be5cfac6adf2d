use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

use crate::config::settings::{LogRotation, LoggingConfig};

/// Environment variable holding an `EnvFilter` directive that overrides the config
pub const LOG_ENV: &str = "SCOUT_LOG";

/// Keeps the background writer alive; drop it last.
#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Initialize logging.
///
/// Logs go to stderr unless `logging.file` is set, in which case they are
/// written through a non-blocking appender using the configured rotation.
/// Stdout is left alone so command output stays machine readable.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let (writer, guard, target) = match config.file.as_deref() {
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, None)
        }
        Some(raw) => {
            let (writer, guard, path) = open_file_writer(raw, config.rotation, config.keep)?;
            (writer, guard, Some(path))
        }
    };

    let filter = build_filter(&config.level);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // Already initialized (e.g. in tests).

    if let Some(path) = target {
        tracing::info!(
            log_file = %path.display(),
            rotation = ?config.rotation,
            "writing logs to file"
        );
    }

    Ok(LogGuard(guard))
}

fn build_filter(level: &str) -> EnvFilter {
    if let Ok(directive) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directive) {
            return filter;
        }
    }
    EnvFilter::try_new(format!("scout={level},warn")).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn open_file_writer(
    raw: &str,
    rotation: LogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, WorkerGuard, PathBuf)> {
    let base = resolve_log_path(raw);
    let (dir, base_name) = split_dir_and_name(&base)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    match rotation {
        LogRotation::None => {
            let file = open_append(&base)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, guard, base))
        }
        LogRotation::Daily => {
            // tracing_appender names daily files `{base_name}.{YYYY-MM-DD}`
            prune_rotated(&dir, &format!("{base_name}."), keep.unwrap_or(7))?;
            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, guard, base))
        }
        LogRotation::Session => {
            prune_rotated(&dir, &format!("{base_name}.session-"), keep.unwrap_or(20))?;
            let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let session_path = dir.join(format!("{base_name}.session-{ts}"));
            let file = open_append(&session_path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, guard, session_path))
        }
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Expand `~` and treat directory-looking values as `<dir>/scout.log`.
fn resolve_log_path(raw: &str) -> PathBuf {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => dirs::home_dir()
            .map(|home| format!("{}{}", home.display(), rest))
            .unwrap_or_else(|| raw.to_string()),
        _ => raw.to_string(),
    };

    let path = PathBuf::from(&expanded);
    if expanded.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return path.join("scout.log");
    }
    path
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid log file path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

/// Remove all but the newest `keep` files starting with `prefix`.
///
/// Both rotation suffixes sort lexicographically by time.
fn prune_rotated(dir: &Path, prefix: &str, keep: usize) -> Result<()> {
    if keep == 0 {
        return Ok(());
    }

    let mut candidates: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(prefix))
        .collect();

    candidates.sort_unstable_by(|a, b| b.cmp(a));

    for name in candidates.into_iter().skip(keep) {
        let path = dir.join(&name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

/// Key prefixes that are masked by [`redact_secrets`]
const SECRET_PREFIXES: &[&str] = &["sk-", "tvly-", "BSA"];

/// Best-effort redaction for API keys that backends echo back in error bodies.
pub fn redact_secrets(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    'outer: while !rest.is_empty() {
        for prefix in SECRET_PREFIXES {
            if let Some(tail) = rest.strip_prefix(prefix) {
                let token_len = tail
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                    .unwrap_or(tail.len());

                // Short tokens are more likely prose than keys.
                if token_len >= 8 {
                    out.push_str(prefix);
                    out.push_str("***REDACTED***");
                    rest = &tail[token_len..];
                    continue 'outer;
                }
            }
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_known_key_shapes() {
        let input = "bad key tvly-abcdef123456 and sk-ant-0123456789xyz here";
        let redacted = redact_secrets(input);
        assert_eq!(
            redacted,
            "bad key tvly-***REDACTED*** and sk-***REDACTED*** here"
        );
    }

    #[test]
    fn test_short_tokens_untouched() {
        assert_eq!(redact_secrets("ask-me sk-1"), "ask-me sk-1");
        assert_eq!(redact_secrets("naïve text"), "naïve text");
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempfile::TempDir::new().unwrap();
        for day in ["2026-01-01", "2026-01-02", "2026-01-03"] {
            std::fs::write(dir.path().join(format!("scout.log.{day}")), "x").unwrap();
        }
        std::fs::write(dir.path().join("other.txt"), "x").unwrap();

        prune_rotated(dir.path(), "scout.log.", 2).unwrap();

        assert!(!dir.path().join("scout.log.2026-01-01").exists());
        assert!(dir.path().join("scout.log.2026-01-02").exists());
        assert!(dir.path().join("scout.log.2026-01-03").exists());
        assert!(dir.path().join("other.txt").exists());
    }

    #[test]
    fn test_directory_path_gets_default_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let resolved = resolve_log_path(dir.path().to_str().unwrap());
        assert_eq!(resolved, dir.path().join("scout.log"));
    }
}
