use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix; nested keys use `__`, e.g. `REENCODE_POOL__WORKERS`.
const ENV_PREFIX: &str = "REENCODE_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Like [`load_config`], but a missing file means defaults plus environment
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    if path.exists() {
        extract(figment.merge(Toml::file(path)))
    } else {
        extract(figment)
    }
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[pool]
workers = 4

[ledger]
path = "/var/lib/reencode/done.json"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.pool.workers, 4);
        assert_eq!(config.pool.queue_capacity, 1);
        assert_eq!(config.ledger.path, PathBuf::from("/var/lib/reencode/done.json"));
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[pool]
workers = "many"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config(Path::new("/nonexistent/reencode.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        let config = load_config_or_default(Path::new("/nonexistent/reencode.toml")).unwrap();
        assert_eq!(config.ledger.path, PathBuf::from("allMP3s.json"));
        assert_eq!(config.converter.work_file_prefix, "wip-");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[converter]
ffmpeg_path = "/usr/local/bin/ffmpeg"
extra_ffmpeg_args = ["-threads", "1"]

[converter.skip_lower_bitrate]
mp3 = false

[metrics]
textfile = "reencode.prom"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(
            config.converter.ffmpeg_path,
            PathBuf::from("/usr/local/bin/ffmpeg")
        );
        assert_eq!(config.converter.extra_ffmpeg_args, vec!["-threads", "1"]);
        assert!(!config.converter.skip_lower_bitrate.mp3);
        assert_eq!(config.metrics.textfile, Some(PathBuf::from("reencode.prom")));
        assert_eq!(config.pool.workers, 10);
    }
}
