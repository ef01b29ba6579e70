// ABOUTME: Bookmark emitters turning discovered endpoints into files a URL launcher can open
// ABOUTME: The webloc writer produces one property-list file per (host, scheme) pair

use crate::index::Bookmark;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const WEBLOC_EXTENSION: &str = "webloc";

pub trait BookmarkWriter {
    fn write(&self, bookmark: &Bookmark) -> Result<()>;
}

/// Write every bookmark, logging failures instead of stopping. Returns
/// how many were written.
pub fn write_all<W: BookmarkWriter + ?Sized>(writer: &W, bookmarks: &[Bookmark]) -> usize {
    let mut written = 0;
    for bookmark in bookmarks {
        match writer.write(bookmark) {
            Ok(()) => written += 1,
            Err(e) => tracing::error!("Can't write bookmark for host {}: {:#}", bookmark.endpoint.host, e),
        }
    }
    written
}

pub struct WeblocWriter {
    dir: PathBuf,
}

impl WeblocWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory and clear out bookmarks from earlier runs.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create bookmark directory: {}", self.dir.display()))?;

        let listing = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list bookmark directory: {}", self.dir.display()))?;
        for entry in listing {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == WEBLOC_EXTENSION) {
                tracing::debug!("Removing stale bookmark {}", path.display());
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove stale bookmark: {}", path.display()))?;
            }
        }
        Ok(())
    }

    pub fn file_name(bookmark: &Bookmark) -> Result<String> {
        let host = &bookmark.endpoint.host;
        if host.is_empty() || host.contains('/') || host.starts_with('.') {
            anyhow::bail!(
                "{} with protocol {} would result in a bad filename",
                host,
                bookmark.endpoint.scheme
            );
        }
        Ok(format!("{} ({}).{}", host, bookmark.endpoint.scheme, WEBLOC_EXTENSION))
    }

    pub fn render(bookmark: &Bookmark) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>URL</key>
    <string>{}</string>
</dict>
</plist>
"#,
            xml_escape(&bookmark.url())
        )
    }
}

impl BookmarkWriter for WeblocWriter {
    fn write(&self, bookmark: &Bookmark) -> Result<()> {
        let path = self.dir.join(Self::file_name(bookmark)?);
        fs::write(&path, Self::render(bookmark))
            .with_context(|| format!("Failed to write bookmark: {}", path.display()))
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Endpoint;
    use tempfile::TempDir;

    fn bookmark(host: &str, scheme: &str, port: Option<&str>) -> Bookmark {
        Bookmark {
            endpoint: Endpoint::new(host, scheme),
            port: port.map(str::to_string),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            WeblocWriter::file_name(&bookmark("web1", "mosh", None)).unwrap(),
            "web1 (mosh).webloc"
        );
        assert!(WeblocWriter::file_name(&bookmark("../escape", "ssh", None)).is_err());
        assert!(WeblocWriter::file_name(&bookmark("/etc/passwd", "ssh", None)).is_err());
    }

    #[test]
    fn test_render_includes_port() {
        let body = WeblocWriter::render(&bookmark("git.internal", "ssh", Some("2222")));
        assert!(body.contains("<string>ssh://git.internal:2222</string>"));
        assert!(body.starts_with("<?xml"));
    }

    #[test]
    fn test_prepare_removes_only_stale_bookmarks() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("bookmarks");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("old (ssh).webloc"), "stale").unwrap();
        fs::write(out.join("notes.txt"), "keep me").unwrap();

        let writer = WeblocWriter::new(&out);
        writer.prepare().unwrap();

        assert!(!out.join("old (ssh).webloc").exists());
        assert!(out.join("notes.txt").exists());
    }

    #[test]
    fn test_prepare_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("bookmarks");

        WeblocWriter::new(&out).prepare().unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_write_all_continues_past_failures() {
        let temp_dir = TempDir::new().unwrap();
        let writer = WeblocWriter::new(temp_dir.path());
        let bookmarks = vec![
            bookmark("good", "ssh", None),
            bookmark("bad/name", "ssh", None),
            bookmark("also-good", "mosh", None),
        ];

        assert_eq!(write_all(&writer, &bookmarks), 2);
        let written = fs::read_to_string(temp_dir.path().join("also-good (mosh).webloc")).unwrap();
        assert!(written.contains("mosh://also-good"));
    }
}
