use anyhow::{Context, bail};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::io::Read;

/// Rank used for items that carry no rank when ordering by rank.
pub const RANK_SENTINEL: f64 = 999.0;

// ────────────────────────────────────────────────────────────────────────────
// DatasetDoc: binary snapshot
// ────────────────────────────────────────────────────────────────────────────

const SNAPSHOT_MAGIC: &[u8; 6] = b"OPPMAP";
const SNAPSHOT_VERSION: u32 = 1;
const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 4;

/// A dataset as stored by `oppmap snapshot`: magic, little-endian version,
/// then the bincode body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDoc {
    pub dataset: Dataset,
}

impl DatasetDoc {
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let body = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .context("encode dataset snapshot")?;
        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(SNAPSHOT_MAGIC);
        out.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decode a snapshot and re-check the dataset invariants the loader enforces.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let Some((header, body)) = bytes.split_at_checked(HEADER_LEN) else {
            bail!("snapshot truncated: {} bytes, header needs {}", bytes.len(), HEADER_LEN);
        };
        let (magic, version) = header.split_at(SNAPSHOT_MAGIC.len());
        if magic != SNAPSHOT_MAGIC.as_slice() {
            bail!("not an oppmap snapshot");
        }
        let version = match version {
            [a, b, c, d] => u32::from_le_bytes([*a, *b, *c, *d]),
            _ => bail!("snapshot header is malformed"),
        };
        if version != SNAPSHOT_VERSION {
            bail!("snapshot version {} is not supported (expected {})", version, SNAPSHOT_VERSION);
        }
        let (doc, read): (DatasetDoc, usize) =
            bincode::serde::decode_from_slice(body, bincode::config::standard())
                .context("decode dataset snapshot")?;
        if read != body.len() {
            bail!("{} unexpected bytes after the snapshot body", body.len() - read);
        }
        doc.dataset
            .validate()
            .context("snapshot holds an inconsistent dataset")?;
        Ok(doc)
    }

    pub fn save_to_binary(&self, path: impl AsRef<Utf8Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).with_context(|| format!("write snapshot {}", path))
    }

    pub fn load_from_binary(path: impl AsRef<Utf8Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("read snapshot {}", path))?;
        Self::from_bytes(&bytes).with_context(|| format!("load snapshot {}", path))
    }

    /// Returns `true` when the file starts with the snapshot magic bytes.
    pub fn is_snapshot(path: impl AsRef<Utf8Path>) -> bool {
        let Ok(mut file) = std::fs::File::open(path.as_ref()) else {
            return false;
        };
        let mut magic = [0u8; SNAPSHOT_MAGIC.len()];
        file.read_exact(&mut magic).is_ok() && &magic == SNAPSHOT_MAGIC
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dataset
// ────────────────────────────────────────────────────────────────────────────

/// The full report dataset. Loaded once and treated as read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub meta: Meta,
    /// Categories, in dataset order.
    pub domains: Vec<Category>,
    /// Catalog items (opportunities and use cases), in dataset order.
    pub usecases: Vec<CatalogItem>,
    pub workflows: Vec<Workflow>,
    pub foundations: Vec<Foundation>,
    pub indexes: Indexes,
}

impl Dataset {
    pub fn item(&self, id: &str) -> Option<&CatalogItem> {
        self.usecases.iter().find(|u| u.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn workflow(&self, id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.id == id)
    }

    /// Items whose category id equals `category_id`, in dataset order.
    pub fn items_in_category<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a CatalogItem> + 'a {
        self.usecases
            .iter()
            .filter(move |u| u.category_id.as_deref() == Some(category_id))
    }

    pub fn top_ids(&self) -> &BTreeSet<String> {
        &self.indexes.top_opportunity_ids
    }

    pub fn opportunities(&self) -> impl Iterator<Item = &CatalogItem> {
        self.usecases.iter().filter(|u| u.is_opportunity())
    }

    /// Check the identity invariants: item and category ids are unique and every
    /// item category reference points at an existing category.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut category_ids = HashSet::new();
        for d in &self.domains {
            if !category_ids.insert(d.id.as_str()) {
                bail!("Duplicate domain id '{}'", d.id);
            }
        }
        let mut item_ids = HashSet::new();
        for u in &self.usecases {
            if !item_ids.insert(u.id.as_str()) {
                bail!("Duplicate use case id '{}'", u.id);
            }
            if let Some(cid) = &u.category_id {
                if !category_ids.contains(cid.as_str()) {
                    bail!("Use case '{}' references unknown domain '{}'", u.id, cid);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub counts: MetaCounts,
    pub generated_at: Option<String>,
}

impl Meta {
    /// One-line summary shown under every view.
    pub fn footer(&self) -> String {
        format!(
            "{} domains • {} items • {} workflows • {} metrics • generated {}",
            self.counts.domains,
            self.counts.usecases,
            self.counts.workflows,
            self.counts.metrics,
            self.generated_at.as_deref().unwrap_or("(unknown)")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaCounts {
    pub domains: u64,
    pub usecases: u64,
    pub workflows: u64,
    pub metrics: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indexes {
    /// Items flagged as top opportunities by the dataset generator.
    pub top_opportunity_ids: BTreeSet<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Category
// ────────────────────────────────────────────────────────────────────────────

/// A grouping of catalog items (a business domain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// CatalogItem
// ────────────────────────────────────────────────────────────────────────────

/// One opportunity or use-case record.
///
/// Every optional field is `None` when the dataset omits it or leaves it blank;
/// presentation code substitutes a "not stated" placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Owning category id (`domain_id` in the dataset).
    pub category_id: Option<String>,
    /// Category display name as written on the item (`domain` in the dataset).
    pub category_name: Option<String>,
    pub item_level: Option<ItemLevel>,
    pub rank: Option<f64>,
    pub summary: Option<String>,
    pub primary_outcome: Option<String>,
    pub metric_type: Option<MetricType>,
    pub complexity: Option<Complexity>,
    pub time_to_value: Option<String>,
    pub dependencies: Option<String>,
    pub vendors_tools: Option<String>,
    pub risks_compliance: Option<String>,
    /// Derived approach labels, in dataset order.
    pub patterns: Vec<PatternTag>,
    /// Derived number of quantified claims in the source text.
    pub quant_claim_count: u32,
    pub deployment_hint: Option<DeploymentHint>,
    pub claims: Vec<Claim>,
    pub evidence: Evidence,
    pub raw_current_state_pain: Option<String>,
    pub raw_automatable_units: Option<String>,
    pub raw_approach: Option<String>,
}

impl CatalogItem {
    /// Minimal item with only an id and a name; used by builders and tests.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category_id: None,
            category_name: None,
            item_level: None,
            rank: None,
            summary: None,
            primary_outcome: None,
            metric_type: None,
            complexity: None,
            time_to_value: None,
            dependencies: None,
            vendors_tools: None,
            risks_compliance: None,
            patterns: Vec::new(),
            quant_claim_count: 0,
            deployment_hint: None,
            claims: Vec::new(),
            evidence: Evidence::default(),
            raw_current_state_pain: None,
            raw_automatable_units: None,
            raw_approach: None,
        }
    }

    pub fn is_opportunity(&self) -> bool {
        matches!(self.item_level, Some(ItemLevel::Opportunity))
    }

    pub fn is_use_case(&self) -> bool {
        matches!(self.item_level, Some(ItemLevel::UseCase))
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(Untitled)"
        } else {
            &self.name
        }
    }

    /// Sort key for rank ordering; missing ranks sort last.
    pub fn rank_key(&self) -> f64 {
        self.rank.unwrap_or(RANK_SENTINEL)
    }

    /// Lower-cased text searched by the free-text filter.
    pub fn search_blob(&self) -> String {
        let patterns = self
            .patterns
            .iter()
            .map(PatternTag::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        [
            self.name.as_str(),
            self.category_name.as_deref().unwrap_or(""),
            self.summary.as_deref().unwrap_or(""),
            self.primary_outcome.as_deref().unwrap_or(""),
            self.metric_type.as_ref().map(MetricType::as_str).unwrap_or(""),
            self.dependencies.as_deref().unwrap_or(""),
            self.vendors_tools.as_deref().unwrap_or(""),
            self.risks_compliance.as_deref().unwrap_or(""),
            patterns.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// Item-level classifier. The dataset domain is open; unknown values are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemLevel {
    Opportunity,
    UseCase,
    Other(String),
}

impl ItemLevel {
    pub fn as_str(&self) -> &str {
        match self {
            ItemLevel::Opportunity => "Opportunity",
            ItemLevel::UseCase => "UseCase",
            ItemLevel::Other(s) => s,
        }
    }
}

impl From<String> for ItemLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Opportunity" => ItemLevel::Opportunity,
            "UseCase" => ItemLevel::UseCase,
            _ => ItemLevel::Other(s),
        }
    }
}

impl From<ItemLevel> for String {
    fn from(level: ItemLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for ItemLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Label newtypes
// ────────────────────────────────────────────────────────────────────────────

macro_rules! label_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Trim `raw`; blank input yields `None`.
            pub fn new(raw: &str) -> Option<Self> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

label_type!(
    /// How an item's impact is measured (e.g. cost, cycle time).
    MetricType
);
label_type!(
    /// Implementation complexity. Datasets usually say `Low`, `Med`/`Medium` or `High`.
    Complexity
);
label_type!(
    /// Whether a capability is self-hostable or vendor-provided, derived from text.
    DeploymentHint
);
label_type!(
    /// A recurring technical approach such as `OCR` or `RAG`.
    PatternTag
);

impl Complexity {
    /// Levels the dataset generator normally emits. Others are kept as written.
    pub const KNOWN: &'static [&'static str] = &["Low", "Med", "Medium", "High"];

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.as_str())
    }
}

impl DeploymentHint {
    pub fn is_self_hosted(&self) -> bool {
        self.as_str().contains("Self")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Supporting types
// ────────────────────────────────────────────────────────────────────────────

/// Where a record was extracted from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub doc: Option<String>,
    pub reference: Option<String>,
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} • {}",
            self.doc.as_deref().unwrap_or(""),
            self.reference.as_deref().unwrap_or("")
        )
    }
}

/// A quantified impact claim, as stated in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub value: Option<String>,
    pub context: Option<String>,
}

/// A before/after process description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub domain: Option<String>,
    pub intervention: Option<String>,
    pub stakeholders_roles: Option<String>,
    pub before_steps: Option<String>,
    pub after_steps: Option<String>,
    pub evidence: Evidence,
}

/// A platform capability section (governance, security, integration, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Foundation {
    pub id: String,
    pub area: String,
    pub summary: Option<String>,
    pub full_excerpt: Option<String>,
    pub evidence: Evidence,
}
