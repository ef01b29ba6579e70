// ABOUTME: Line-by-line reader for SSH text files that treats a missing file as empty input
// ABOUTME: Shared by the ssh_config and known_hosts parsers so both stay lazy

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

pub struct LineScanner {
    lines: Option<Lines<BufReader<File>>>,
}

impl LineScanner {
    /// Open `path` for line-wise reading. A file that does not exist
    /// yields a scanner with no lines; every other open failure is an error.
    pub fn open(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Ok(Self {
                lines: Some(BufReader::new(file).lines()),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self { lines: None }),
            Err(e) => Err(e).with_context(|| format!("Failed to open {}", path.display())),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.lines.is_none()
    }
}

impl Iterator for LineScanner {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.as_mut()?.next()
    }
}
