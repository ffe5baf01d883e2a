//! Directory enumeration and the HTML index page.

use std::fmt;
use std::fs::FileType;
use std::io;
use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use crate::error::FileServerError;

/// Prefix of the download endpoint.
pub const DOWNLOAD_PREFIX: &str = "/download/";

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read the immediate children of `dir`, directories first, then by name.
///
/// Symlinks are classified by their target; dangling links count as files.
pub async fn read_entries(dir: &Path) -> Result<Vec<DirectoryEntry>, FileServerError> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let file_type = entry.file_type().await;
        if let Some(entry) = directory_entry(&entry.path(), file_type).await {
            entries.push(entry);
        }
    }

    sort_entries(&mut entries);
    debug!("Read {} entries from {}", entries.len(), dir.display());
    Ok(entries)
}

/// Classify one child. Entries whose type cannot be read, usually because
/// they vanished mid-listing, are skipped.
async fn directory_entry(
    path: &Path,
    file_type: io::Result<FileType>,
) -> Option<DirectoryEntry> {
    let file_type = match file_type {
        Ok(file_type) => file_type,
        Err(err) => {
            warn!("Skipping unreadable entry {}: {}", path.display(), err);
            return None;
        }
    };

    let is_dir = if file_type.is_symlink() {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    } else {
        file_type.is_dir()
    };

    Some(DirectoryEntry {
        name: path.file_name()?.to_string_lossy().into_owned(),
        is_dir,
    })
}

pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn encode_segments(relative: &str) -> String {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// URL of the listing page for a root-relative directory path.
pub fn listing_href(relative: &str) -> String {
    format!("/{}", encode_segments(relative))
}

/// URL of the download endpoint for a root-relative file path.
pub fn download_href(relative: &str) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, encode_segments(relative))
}

fn parent_of(relative: &str) -> &str {
    relative.rsplit_once('/').map_or("", |(parent, _)| parent)
}

fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub label: String,
    pub download: bool,
}

/// The rendered index of one directory.
///
/// Fields hold raw text; escaping happens when the page is displayed.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub title: String,
    pub parent: Option<Link>,
    pub links: Vec<Link>,
}

impl ListingPage {
    /// Build the page for the directory at `relative` (empty for the root).
    pub fn new(relative: &str, entries: &[DirectoryEntry]) -> Self {
        let relative = relative.trim_matches('/');
        let title = if relative.is_empty() {
            "/".to_string()
        } else {
            format!("/{relative}/")
        };

        let parent = (!relative.is_empty()).then(|| Link {
            href: listing_href(parent_of(relative)),
            label: "Parent Directory".to_string(),
            download: false,
        });

        let links = entries
            .iter()
            .map(|entry| {
                let path = join_relative(relative, &entry.name);
                Link {
                    href: if entry.is_dir {
                        listing_href(&path)
                    } else {
                        download_href(&path)
                    },
                    label: entry.name.clone(),
                    download: !entry.is_dir,
                }
            })
            .collect();

        Self {
            title,
            parent,
            links,
        }
    }
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Downloads</title>
<style>
body { background-color: #1a1a1a; color: #fff; font-family: Arial, sans-serif; padding: 20px; }
h1 { color: #f3f3f3; text-align: center; }
ul { list-style: none; padding: 0; }
li { margin: 10px 0; }
a, a:visited { color: #f3f3f3; text-decoration: none; }
a:hover { color: #f07fae; }
</style>
</head>
<body>
"#;

const PAGE_TAIL: &str = "</ul>\n</body>\n</html>\n";

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let download = if self.download { " download" } else { "" };
        writeln!(
            f,
            "<li> - <a{} href=\"{}\">{}</a></li>",
            download,
            html_escape(&self.href),
            html_escape(&self.label)
        )
    }
}

impl fmt::Display for ListingPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(PAGE_HEAD)?;
        writeln!(f, "<h1>Downloads - {}</h1>", html_escape(&self.title))?;
        f.write_str("<ul>\n")?;
        if let Some(parent) = &self.parent {
            write!(f, "{parent}")?;
        }
        for link in &self.links {
            write!(f, "{link}")?;
        }
        f.write_str(PAGE_TAIL)
    }
}
