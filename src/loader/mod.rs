//! Dataset loading.
//!
//! A report site ships its dataset either as `data.json` next to `index.html`
//! or embedded into the page as `<script id="embeddedData">`. Embedded data wins
//! so a site opened straight from disk still works. The loader accepts:
//!
//! - a `.json` file
//! - an `.html` page (embedded data, else the sibling `data.json`)
//! - a site directory (searched with [`walkdir`] for the shallowest site root)
//! - a `.zip` bundle of a site
//! - a binary snapshot written by [`DatasetDoc::save_to_binary`]
//!
//! Sub-modules:
//!
//! - [`source`] – File I/O abstraction (filesystem vs. ZIP)
//! - [`raw`] – lenient JSON wire types

mod raw;
pub mod source;

pub use source::*;

use crate::model::{Dataset, DatasetDoc};
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// `id` of the script element carrying the embedded dataset.
pub const EMBEDDED_SCRIPT_ID: &str = "embeddedData";
const PAGE_FILE: &str = "index.html";
const DATA_FILE: &str = "data.json";

/// Load a dataset from any supported location, dispatching on what `path` is.
pub fn load_dataset(path: impl AsRef<Utf8Path>) -> Result<Dataset> {
    let path = path.as_ref();
    if path.is_dir() {
        let mut loader = DatasetLoader::new(FsSource);
        return loader.load_site_in(path);
    }
    if DatasetDoc::is_snapshot(path) {
        tracing::debug!(%path, "loading binary snapshot");
        let doc = DatasetDoc::load_from_binary(path)
            .with_context(|| format!("Failed to load snapshot {}", path))?;
        return Ok(doc.dataset);
    }
    match path.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("zip") => {
            let file = std::fs::File::open(path).with_context(|| format!("Open {}", path))?;
            let reader = std::io::BufReader::new(file);
            let mut loader = DatasetLoader::new(ZipSource::new(reader)?);
            loader
                .load_site_in(Utf8Path::new(""))
                .with_context(|| format!("Failed to load bundle {}", path))
        }
        Some("html") | Some("htm") => DatasetLoader::new(FsSource).load_page(path),
        _ => DatasetLoader::new(FsSource).load_json(path),
    }
}

/// Parse and validate dataset JSON text.
pub fn parse_dataset_json(text: &str) -> Result<Dataset> {
    let raw: raw::RawDataset = serde_json::from_str(text).context("Failed to parse dataset JSON")?;
    let dataset = Dataset::from(raw);
    dataset.validate()?;
    tracing::info!(
        domains = dataset.domains.len(),
        usecases = dataset.usecases.len(),
        workflows = dataset.workflows.len(),
        foundations = dataset.foundations.len(),
        top_ids = dataset.indexes.top_opportunity_ids.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Loads datasets through a [`ContentSource`].
pub struct DatasetLoader<S: ContentSource> {
    source: S,
}

impl<S: ContentSource> DatasetLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Parse a `data.json` file.
    pub fn load_json(&mut self, path: &Utf8Path) -> Result<Dataset> {
        let text = self.source.read_to_string(path)?;
        parse_dataset_json(&text).with_context(|| format!("Failed to load dataset {}", path))
    }

    /// Load from a page: embedded data first, else `data.json` beside the page.
    pub fn load_page(&mut self, path: &Utf8Path) -> Result<Dataset> {
        let html = self.source.read_to_string(path)?;
        if let Some(json) = extract_embedded_json(&html) {
            tracing::debug!(%path, "using embedded dataset");
            return parse_dataset_json(&json)
                .with_context(|| format!("Failed to load embedded dataset in {}", path));
        }
        let data = path
            .parent()
            .map(|p| p.join(DATA_FILE))
            .unwrap_or_else(|| Utf8PathBuf::from(DATA_FILE));
        tracing::debug!(%path, %data, "no embedded dataset, falling back to data file");
        self.load_json(&data)
    }

    /// Find the shallowest site root under `dir` and load it.
    pub fn load_site_in(&mut self, dir: &Utf8Path) -> Result<Dataset> {
        let files = self.source.list_files(dir)?;
        let entry = find_site_entry(&files)
            .ok_or_else(|| anyhow!("No {} or {} found in {}", PAGE_FILE, DATA_FILE, dir))?;
        if entry.file_name() == Some(PAGE_FILE) {
            self.load_page(&entry)
        } else {
            self.load_json(&entry)
        }
    }
}

/// Pick the site entry point: the shallowest `index.html` or `data.json`,
/// preferring the page when both sit in the same directory.
pub fn find_site_entry(files: &[Utf8PathBuf]) -> Option<Utf8PathBuf> {
    files
        .iter()
        .filter_map(|f| match f.file_name() {
            Some(PAGE_FILE) => Some((f.components().count(), 0u8, f)),
            Some(DATA_FILE) => Some((f.components().count(), 1u8, f)),
            _ => None,
        })
        .min_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)))
        .map(|(_, _, f)| f.clone())
}

// ────────────────────────────────────────────────────────────────────────────
// Embedded dataset extraction
// ────────────────────────────────────────────────────────────────────────────

/// Return the trimmed body of `<script id="embeddedData">`, if present and non-empty.
///
/// The page is scanned with a tolerant `quick-xml` reader (HTML void elements
/// and unquoted attributes are fine). If the page is too far from XML for the
/// reader, a plain text search is used instead.
pub fn extract_embedded_json(html: &str) -> Option<String> {
    let body = match scan_embedded_script(html) {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!(error = %e, "markup scan failed, searching page text");
            search_embedded_script(html)
        }
    }?;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn scan_embedded_script(html: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref().eq_ignore_ascii_case(b"script") => {
                let is_embedded = e.html_attributes().flatten().any(|a| {
                    a.key.as_ref() == b"id" && a.value.as_ref() == EMBEDDED_SCRIPT_ID.as_bytes()
                });
                let text = reader.read_text(e.name())?;
                if is_embedded {
                    return Ok(Some(text.into_owned()));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn search_embedded_script(html: &str) -> Option<String> {
    let id_at = [
        format!("id=\"{}\"", EMBEDDED_SCRIPT_ID),
        format!("id='{}'", EMBEDDED_SCRIPT_ID),
        format!("id={}", EMBEDDED_SCRIPT_ID),
    ]
    .iter()
    .find_map(|needle| html.find(needle.as_str()))?;
    let open_end = id_at + html[id_at..].find('>')? + 1;
    let close = open_end + html[open_end..].to_ascii_lowercase().find("</script")?;
    Some(html[open_end..close].to_string())
}
