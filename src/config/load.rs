use std::io::Write;
use std::path::{Path, PathBuf};

use crate::bootstrap::AppPaths;
use crate::config::schema::AppConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub verbose: Option<bool>,
}

pub fn load_config(paths: &AppPaths, overrides: &CliOverrides) -> AppResult<AppConfig> {
    let mut config = if paths.config_file.exists() {
        read_config(&paths.config_file)?
    } else {
        let defaults = AppConfig::default();
        store_config(&paths.config_file, &defaults)?;
        defaults
    };

    apply_env_overrides(&mut config);
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

// Every field falls back to its default when missing or malformed; a config
// file that fails to parse behaves like an empty one. Secrets stay readable
// by the owning user only.
fn read_config(path: &Path) -> AppResult<AppConfig> {
    let raw = std::fs::read_to_string(path)?;
    let table = match toml::from_str::<toml::Table>(&raw) {
        Ok(table) => table,
        Err(error) => {
            tracing::warn!(
                "config at {} is not valid toml ({error}); falling back to defaults",
                path.display()
            );
            toml::Table::new()
        }
    };
    Ok(config_from_table(&table))
}

fn config_from_table(table: &toml::Table) -> AppConfig {
    let defaults = AppConfig::default();
    AppConfig {
        base_url: string_field(table, "base_url", defaults.base_url),
        capture_tool: path_field(table, "capture_tool", defaults.capture_tool),
        api_key: table
            .get("api_key")
            .and_then(toml::Value::as_str)
            .map(str::to_owned)
            .unwrap_or(defaults.api_key),
        compression_level: level_field(table, "compression_level", defaults.compression_level),
        save_to_disk: bool_field(table, "save_to_disk", defaults.save_to_disk),
        save_directory: path_field(table, "save_directory", defaults.save_directory),
        default_service: string_field(table, "default_service", defaults.default_service),
        image_format: string_field(table, "image_format", defaults.image_format),
        verbose: bool_field(table, "verbose", defaults.verbose),
        raw_file: bool_field(table, "raw_file", defaults.raw_file),
        notify: bool_field(table, "notify", defaults.notify),
        annotation_font: string_field(table, "annotation_font", defaults.annotation_font),
        annotation_color: string_field(table, "annotation_color", defaults.annotation_color),
    }
}

fn string_field(table: &toml::Table, key: &str, default: String) -> String {
    match table.get(key).and_then(toml::Value::as_str) {
        Some(value) if !value.trim().is_empty() => value.to_owned(),
        _ => default,
    }
}

fn path_field(table: &toml::Table, key: &str, default: PathBuf) -> PathBuf {
    match table.get(key).and_then(toml::Value::as_str) {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default,
    }
}

fn bool_field(table: &toml::Table, key: &str, default: bool) -> bool {
    table
        .get(key)
        .and_then(toml::Value::as_bool)
        .unwrap_or(default)
}

fn level_field(table: &toml::Table, key: &str, default: u8) -> u8 {
    table
        .get(key)
        .and_then(toml::Value::as_integer)
        .and_then(|value| u8::try_from(value).ok())
        .unwrap_or(default)
}

pub fn store_config(path: &Path, config: &AppConfig) -> AppResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let data = toml::to_string_pretty(config)?;
    let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
    temp.write_all(data.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = temp.as_file().metadata()?.permissions();
        perms.set_mode(0o600);
        temp.as_file().set_permissions(perms)?;
    }

    temp.persist(path)
        .map_err(|error| AppError::Io(error.error))?;
    Ok(())
}

pub fn store_api_key(paths: &AppPaths, config: &mut AppConfig, key: String) -> AppResult<()> {
    config.api_key = key;
    store_config(&paths.config_file, config)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(value) = std::env::var("SHOTPUT_BASE_URL") {
        if !value.trim().is_empty() {
            config.base_url = value;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_CAPTURE_TOOL") {
        if !value.trim().is_empty() {
            config.capture_tool = PathBuf::from(value);
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_API_KEY") {
        if !value.trim().is_empty() {
            config.api_key = value;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_COMPRESSION_LEVEL") {
        if let Ok(parsed) = value.trim().parse::<u8>() {
            config.compression_level = parsed;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_SAVE_TO_DISK") {
        if let Some(parsed) = parse_bool(&value) {
            config.save_to_disk = parsed;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_SAVE_DIRECTORY") {
        if !value.trim().is_empty() {
            config.save_directory = PathBuf::from(value);
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_DEFAULT_SERVICE") {
        if !value.trim().is_empty() {
            config.default_service = value;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_IMAGE_FORMAT") {
        if !value.trim().is_empty() {
            config.image_format = value;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_VERBOSE") {
        if let Some(parsed) = parse_bool(&value) {
            config.verbose = parsed;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_RAW_FILE") {
        if let Some(parsed) = parse_bool(&value) {
            config.raw_file = parsed;
        }
    }
    if let Ok(value) = std::env::var("SHOTPUT_NOTIFY") {
        if let Some(parsed) = parse_bool(&value) {
            config.notify = parsed;
        }
    }
}

fn apply_cli_overrides(config: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(value) = overrides.verbose {
        config.verbose = value;
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        apply_env_overrides, config_from_table, load_config, parse_bool, store_api_key,
        store_config, CliOverrides,
    };
    use crate::bootstrap::paths::AppPaths;
    use crate::config::schema::AppConfig;
    use std::path::Path;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    struct EnvVarGuard {
        key: &'static str,
        old: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let old = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self { key, old }
        }

        fn clear(key: &'static str) -> Self {
            let old = std::env::var(key).ok();
            std::env::remove_var(key);
            Self { key, old }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            if let Some(value) = self.old.as_ref() {
                std::env::set_var(self.key, value);
            } else {
                std::env::remove_var(self.key);
            }
        }
    }

    fn paths_for(root: &Path) -> AppPaths {
        AppPaths {
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
            config_file: root.join("config/config.toml"),
            history_file: root.join("cache/history"),
            log_file: root.join("cache/shotput.log"),
        }
    }

    fn clear_shotput_env() -> Vec<EnvVarGuard> {
        [
            "SHOTPUT_BASE_URL",
            "SHOTPUT_CAPTURE_TOOL",
            "SHOTPUT_API_KEY",
            "SHOTPUT_COMPRESSION_LEVEL",
            "SHOTPUT_SAVE_TO_DISK",
            "SHOTPUT_SAVE_DIRECTORY",
            "SHOTPUT_DEFAULT_SERVICE",
            "SHOTPUT_IMAGE_FORMAT",
            "SHOTPUT_VERBOSE",
            "SHOTPUT_RAW_FILE",
            "SHOTPUT_NOTIFY",
        ]
        .iter()
        .map(|key| EnvVarGuard::clear(key))
        .collect()
    }

    #[test]
    fn missing_config_file_writes_defaults() {
        let _guard = lock_env();
        let _clean = clear_shotput_env();
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let paths = paths_for(tmp.path());
        paths.ensure_dirs().expect("dirs");
        assert!(!paths.config_file.exists());

        let config = load_config(&paths, &CliOverrides::default()).expect("load config");
        assert!(paths.config_file.exists());
        assert_eq!(config.base_url, "https://api.e-z.host/files");

        let written = std::fs::read_to_string(&paths.config_file).expect("read config");
        assert!(written.contains("base_url"));
        assert!(written.contains("save_to_disk"));
        assert!(written.contains("annotation_color"));
    }

    #[test]
    fn missing_fields_are_filled_from_defaults() {
        let _guard = lock_env();
        let _clean = clear_shotput_env();
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let paths = paths_for(tmp.path());
        paths.ensure_dirs().expect("dirs");
        std::fs::write(
            &paths.config_file,
            "api_key = \"secret\"\nraw_file = true\n",
        )
        .expect("write");

        let config = load_config(&paths, &CliOverrides::default()).expect("load");
        assert_eq!(config.api_key, "secret");
        assert!(config.raw_file);
        assert_eq!(config.image_format, "png");
        assert_eq!(config.compression_level, 0);
        assert!(config.save_to_disk);
    }

    #[test]
    fn malformed_fields_fall_back_to_defaults() {
        let table = toml::from_str::<toml::Table>(
            r#"
base_url = 17
compression_level = "high"
save_to_disk = "maybe"
image_format = ""
"#,
        )
        .expect("parse");

        let config = config_from_table(&table);
        assert_eq!(config.base_url, "https://api.e-z.host/files");
        assert_eq!(config.compression_level, 0);
        assert!(config.save_to_disk);
        assert_eq!(config.image_format, "png");
    }

    #[test]
    fn out_of_range_compression_level_falls_back() {
        let table =
            toml::from_str::<toml::Table>("compression_level = 4000\n").expect("parse");
        let config = config_from_table(&table);
        assert_eq!(config.compression_level, 0);
    }

    #[test]
    fn unparseable_file_behaves_like_empty_one() {
        let _guard = lock_env();
        let _clean = clear_shotput_env();
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let paths = paths_for(tmp.path());
        paths.ensure_dirs().expect("dirs");
        std::fs::write(&paths.config_file, "not= [valid toml").expect("write");

        let config = load_config(&paths, &CliOverrides::default()).expect("load");
        assert_eq!(config.base_url, "https://api.e-z.host/files");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn env_overrides_update_fields() {
        let _guard = lock_env();
        let _clean = clear_shotput_env();
        let _url = EnvVarGuard::set("SHOTPUT_BASE_URL", "http://localhost:9999/files");
        let _tool = EnvVarGuard::set("SHOTPUT_CAPTURE_TOOL", "/opt/bin/grimblast");
        let _key = EnvVarGuard::set("SHOTPUT_API_KEY", "env-key");
        let _level = EnvVarGuard::set("SHOTPUT_COMPRESSION_LEVEL", "55");
        let _save = EnvVarGuard::set("SHOTPUT_SAVE_TO_DISK", "no");
        let _dir = EnvVarGuard::set("SHOTPUT_SAVE_DIRECTORY", "/tmp/shots");
        let _service = EnvVarGuard::set("SHOTPUT_DEFAULT_SERVICE", "otherhost");
        let _format = EnvVarGuard::set("SHOTPUT_IMAGE_FORMAT", "jpeg");
        let _verbose = EnvVarGuard::set("SHOTPUT_VERBOSE", "1");
        let _raw = EnvVarGuard::set("SHOTPUT_RAW_FILE", "true");
        let _notify = EnvVarGuard::set("SHOTPUT_NOTIFY", "off");

        let mut config = AppConfig::default();
        apply_env_overrides(&mut config);
        assert_eq!(config.base_url, "http://localhost:9999/files");
        assert_eq!(config.capture_tool.to_str(), Some("/opt/bin/grimblast"));
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.compression_level, 55);
        assert!(!config.save_to_disk);
        assert_eq!(config.save_directory.to_str(), Some("/tmp/shots"));
        assert_eq!(config.default_service, "otherhost");
        assert_eq!(config.image_format, "jpeg");
        assert!(config.verbose);
        assert!(config.raw_file);
        assert!(!config.notify);
    }

    #[test]
    fn cli_verbose_override_wins_over_file_and_env() {
        let _guard = lock_env();
        let _clean = clear_shotput_env();
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let paths = paths_for(tmp.path());
        paths.ensure_dirs().expect("dirs");
        std::fs::write(&paths.config_file, "verbose = false\n").expect("write");
        let _verbose = EnvVarGuard::set("SHOTPUT_VERBOSE", "false");

        let overrides = CliOverrides {
            verbose: Some(true),
        };
        let config = load_config(&paths, &overrides).expect("load");
        assert!(config.verbose);
    }

    #[test]
    fn parse_bool_accepts_ini_style_spellings() {
        let truthy = ["1", "yes", "on", "TRUE", " true "];
        let falsy = ["0", "no", "off", "FALSE", " off "];
        for value in truthy {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in falsy {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool("enabled"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn store_api_key_persists_for_future_loads() {
        let _guard = lock_env();
        let _clean = clear_shotput_env();
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let paths = paths_for(tmp.path());
        paths.ensure_dirs().expect("dirs");

        let mut config = load_config(&paths, &CliOverrides::default()).expect("load");
        assert!(config.api_key.is_empty());

        store_api_key(&paths, &mut config, "fresh-key".to_owned()).expect("store");
        assert_eq!(config.api_key, "fresh-key");

        let reloaded = load_config(&paths, &CliOverrides::default()).expect("reload");
        assert_eq!(reloaded.api_key, "fresh-key");
    }

    #[test]
    fn store_config_replaces_file_atomically_in_place() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.toml");
        let mut config = AppConfig::default();

        store_config(&path, &config).expect("first write");
        config.raw_file = true;
        store_config(&path, &config).expect("second write");

        let raw = std::fs::read_to_string(&path).expect("read");
        assert!(raw.contains("raw_file = true"));
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path() != path)
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
    }
}
