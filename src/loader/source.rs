//! Content source abstraction for reading dataset files from the filesystem or ZIP bundles.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Read;
use walkdir::WalkDir;

/// Trait for abstracting file I/O (filesystem vs. ZIP bundle).
pub trait ContentSource {
    /// Read a file at the given logical path and return its content as a string.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
    /// List every file below a logical directory path, returning full paths.
    fn list_files(&mut self, path: &Utf8Path) -> Result<Vec<Utf8PathBuf>>;
}

/// Reads files directly from the local filesystem.
pub struct FsSource;

/// Directory depth searched when looking for a site inside a folder.
const MAX_SITE_DEPTH: usize = 4;

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path.as_std_path()).with_context(|| format!("Failed to read {}", path))
    }

    fn list_files(&mut self, path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(path.as_std_path())
            .max_depth(MAX_SITE_DEPTH)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("Walk dir {}", path))?;
            if entry.file_type().is_file() {
                let p = Utf8PathBuf::from_path_buf(entry.into_path())
                    .map_err(|p| anyhow::anyhow!("Non-UTF8 path {}", p.display()))?;
                files.push(p);
            }
        }
        Ok(files)
    }
}

/// Reads files from a ZIP archive (a zipped static site bundle).
pub struct ZipSource<R: Read + std::io::Seek> {
    zip: zip::ZipArchive<R>,
}

impl<R: Read + std::io::Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader).context("Failed to open zip archive")?;
        Ok(Self { zip })
    }
}

fn zip_key(path: &Utf8Path) -> String {
    path.as_str()
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}

impl<R: Read + std::io::Seek> ContentSource for ZipSource<R> {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        let p = zip_key(path);
        let mut f = self
            .zip
            .by_name(&p)
            .with_context(|| format!("File {} not found in zip", p))?;
        let mut s = String::new();
        f.read_to_string(&mut s)
            .with_context(|| format!("Failed to read {} from zip", p))?;
        Ok(s)
    }

    fn list_files(&mut self, path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        let mut files = Vec::new();
        let mut prefix = zip_key(path);
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        for i in 0..self.zip.len() {
            let name = self.zip.by_index(i)?.name().to_string();
            if name.starts_with(&prefix) && !name.ends_with('/') {
                files.push(Utf8PathBuf::from(name));
            }
        }
        files.sort();
        Ok(files)
    }
}
