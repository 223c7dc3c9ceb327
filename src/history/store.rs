use std::io::Write;
use std::path::PathBuf;

use crate::error::AppResult;

/// Plain-text upload log, one URL per line, newest last.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, url: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{url}")?;
        Ok(())
    }

    pub fn list(&self) -> AppResult<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Removes the log. Returns false when there was nothing to clear.
    pub fn clear(&self) -> AppResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryStore;

    #[test]
    fn list_is_empty_when_log_missing() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let store = HistoryStore::new(temp.path().join("files"));
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn append_creates_parent_dirs_and_preserves_order() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let store = HistoryStore::new(temp.path().join("cache/shotput/files"));

        store.append("https://i.e-z.gg/one.png").expect("append");
        store.append("https://i.e-z.gg/two.png").expect("append");

        let urls = store.list().expect("list");
        assert_eq!(
            urls,
            vec![
                "https://i.e-z.gg/one.png".to_owned(),
                "https://i.e-z.gg/two.png".to_owned(),
            ]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let path = temp.path().join("files");
        std::fs::write(&path, "https://a\n\n   \nhttps://b\n").expect("seed");

        let store = HistoryStore::new(path);
        let urls = store.list().expect("list");
        assert_eq!(urls, vec!["https://a".to_owned(), "https://b".to_owned()]);
    }

    #[test]
    fn clear_removes_log_and_reports_whether_it_existed() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let store = HistoryStore::new(temp.path().join("files"));

        assert!(!store.clear().expect("clear empty"));

        store.append("https://i.e-z.gg/one.png").expect("append");
        assert!(store.clear().expect("clear"));
        assert!(store.list().expect("list").is_empty());
        assert!(!store.clear().expect("clear again"));
    }
}
