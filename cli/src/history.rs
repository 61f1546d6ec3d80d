//! Command history persistence
//!
//! CommandHistory with persistence to ~/.streamsql/history. Entries are
//! stored one per line; multi-line statements are joined with spaces.

use std::path::{Path, PathBuf};

use crate::error::{CLIError, Result};

/// Command history manager
pub struct CommandHistory {
    /// History file path
    path: PathBuf,

    /// Maximum history size
    max_size: usize,
}

impl CommandHistory {
    /// Create a history manager at the default location
    pub fn new(max_size: usize) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let path = home.join(".streamsql").join("history");

        Self { path, max_size }
    }

    /// Create with custom path
    pub fn with_path<P: AsRef<Path>>(path: P, max_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_size,
        }
    }

    /// Load history from file, oldest first
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| CLIError::HistoryError(format!("Failed to read history file: {}", e)))?;

        let lines: Vec<String> = contents
            .lines()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .rev()
            .take(self.max_size)
            .collect();

        Ok(lines.into_iter().rev().collect())
    }

    /// Save history to file, keeping the newest `max_size` entries
    pub fn save(&self, history: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let skip = history.len().saturating_sub(self.max_size);
        let contents = history[skip..]
            .iter()
            .map(|s| Self::single_line(s))
            .collect::<Vec<_>>()
            .join("\n");

        std::fs::write(&self.path, contents)
            .map_err(|e| CLIError::HistoryError(format!("Failed to write history file: {}", e)))?;

        Ok(())
    }

    /// Append a command to history
    pub fn append(&self, command: &str) -> Result<()> {
        let command = Self::single_line(command);
        if command.is_empty() {
            return Ok(());
        }

        let mut history = self.load()?;
        // Skip consecutive duplicates
        if history.last().map(|s| s.as_str()) == Some(command.as_str()) {
            return Ok(());
        }

        history.push(command);
        self.save(&history)
    }

    /// Get history file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn single_line(command: &str) -> String {
        command.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_history_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        let history = CommandHistory::with_path(&path, 100);

        let commands = vec!["SELECT 1".to_string(), "SELECT 2".to_string()];
        history.save(&commands).unwrap();

        let loaded = history.load().unwrap();
        assert_eq!(loaded, commands);
    }

    #[test]
    fn test_history_max_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        let history = CommandHistory::with_path(&path, 2);

        let commands = vec![
            "SELECT 1".to_string(),
            "SELECT 2".to_string(),
            "SELECT 3".to_string(),
        ];
        history.save(&commands).unwrap();

        let loaded = history.load().unwrap();
        assert_eq!(loaded, vec!["SELECT 2", "SELECT 3"]);
    }

    #[test]
    fn test_append_skips_duplicates_and_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history");
        let history = CommandHistory::with_path(&path, 100);

        history.append("SELECT 1").unwrap();
        history.append("SELECT 1").unwrap();
        history.append("   ").unwrap();
        history.append("SELECT\n  2").unwrap();

        let loaded = history.load().unwrap();
        assert_eq!(loaded, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("none"), 10);
        assert!(history.load().unwrap().is_empty());
    }
}
