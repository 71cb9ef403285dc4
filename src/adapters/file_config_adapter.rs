//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_usize(&self, section: &str, key: &str, default: usize) -> usize {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
bars_dir = /var/lib/marketstage/bars
instruments_file = /var/lib/marketstage/instruments.csv
benchmark_symbol = NIFTY50

[screening]
week_ends_on = friday

[heatmap]
top_movers = 5
"#;

    #[test]
    fn from_string_parses_config() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();

        assert_eq!(
            adapter.get_string("data", "benchmark_symbol").unwrap(),
            "NIFTY50"
        );
        assert_eq!(
            adapter.get_string("screening", "week_ends_on").unwrap(),
            "friday"
        );
        assert_eq!(adapter.get_usize("heatmap", "top_movers", 10), 5);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();

        assert_eq!(adapter.get_string("data", "nonexistent"), None);
        assert_eq!(adapter.get_usize("heatmap", "nonexistent", 7), 7);
        assert!(adapter.get_bool("screening", "nonexistent", true));
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[x]\na = yes\nb = 0\nc = maybe\n").unwrap();

        assert!(adapter.get_bool("x", "a", false));
        assert!(!adapter.get_bool("x", "b", true));
        // Unparseable values fall back.
        assert!(adapter.get_bool("x", "c", true));
    }

    #[test]
    fn from_file_loads() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "bars_dir").unwrap(),
            "/var/lib/marketstage/bars"
        );
    }
}
