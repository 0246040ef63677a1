//! Terminal folder picker.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use race_buddy_core::backup::{FolderPicker, FolderReference};

/// Picks folders from a command-line argument or an interactive prompt
pub struct CliFolderPicker {
    choice: Option<PathBuf>,
    interactive: bool,
}

impl CliFolderPicker {
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self {
            choice,
            interactive: io::stdin().is_terminal(),
        }
    }

    #[cfg(test)]
    pub const fn non_interactive(choice: Option<PathBuf>) -> Self {
        Self {
            choice,
            interactive: false,
        }
    }

    fn prompt(question: &str) -> Option<String> {
        eprint!("{question}");
        io::stderr().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        let line = line.trim();
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}

impl FolderPicker for CliFolderPicker {
    fn pick_folder(&self) -> Option<PathBuf> {
        if let Some(choice) = &self.choice {
            return Some(choice.clone());
        }
        if !self.interactive {
            return None;
        }
        Self::prompt("Backup folder path (empty to cancel): ").map(PathBuf::from)
    }

    fn confirm_access(&self, folder: &FolderReference) -> bool {
        if !self.interactive {
            return false;
        }
        Self::prompt(&format!(
            "Allow race-buddy to access {}? [y/N] ",
            folder.path.display()
        ))
        .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}
