//! The tag registry (§4.F): a process-global, atomically refreshable cache
//! from [`Identifier`] to [`TagInfo`], loaded from an external
//! tag-definition document with a bundled fallback (§6, §9).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use pqdif_core::{Identifier, PhysicalType};
use quick_xml::events::Event;
use quick_xml::Reader;
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

/// The file name the registry looks for in the working directory before
/// falling back to the bundled document (§6).
pub const DEFAULT_TAGS_FILE_NAME: &str = "PQDIFTagDefinitions.xml";

/// Errors from [`load_default`]/[`load_from_dir`] (§6, §7 resource errors).
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum LoadError {
    /// The candidate file exists but could not be read.
    #[snafu(display("failed to read tag-definition file {path:?}"))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The document (file or bundled) did not parse as the `<tags>` schema.
    #[snafu(display("tag-definition document failed to parse"))]
    Parse { source: quick_xml::Error },
}

/// The element kind a tag's value is stored as, independently of its
/// physical value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Scalar,
    Vector,
    Collection,
}

impl ElementKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "Scalar" => Some(ElementKind::Scalar),
            "Vector" => Some(ElementKind::Vector),
            "Collection" => Some(ElementKind::Collection),
            _ => None,
        }
    }
}

/// One enumerated value valid for a tag whose values are drawn from a
/// closed set (§4.F: "a list of valid `Identifier`s").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierEntry {
    pub name: String,
    pub standard_name: String,
    pub value: Identifier,
    pub description: String,
}

/// A single tag's registered metadata (§4.F).
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub id: Identifier,
    pub name: String,
    pub standard_name: String,
    pub description: String,
    pub element_kind: ElementKind,
    pub physical_type: PhysicalType,
    pub required: bool,
    pub format_string: Option<String>,
    pub identifiers: Vec<IdentifierEntry>,
}

struct Inner {
    by_id: HashMap<Identifier, Arc<TagInfo>>,
}

/// A loaded tag-definition document: process-wide, refreshed atomically
/// behind an `RwLock<Arc<_>>` snapshot so a lookup in progress never
/// observes a half-updated map (§5, §9).
pub struct TagRegistry {
    inner: RwLock<Arc<Inner>>,
}

static REGISTRY: Lazy<TagRegistry> = Lazy::new(|| {
    TagRegistry {
        inner: RwLock::new(Arc::new(parse_document(pqdif_dictionary_std::DEFAULT_TAGS_XML).unwrap_or_else(|e| {
            warn!(error = %e, "bundled tag document failed to parse; starting with an empty registry");
            Inner {
                by_id: HashMap::new(),
            }
        }))),
    }
});

/// Look up a tag's metadata by its identifier. `O(1)` after the registry
/// has been loaded once (§4.F).
pub fn get(id: Identifier) -> Option<Arc<TagInfo>> {
    REGISTRY.inner.read().unwrap().by_id.get(&id).cloned()
}

/// Replace the process-global registry with the contents of `doc`,
/// publishing the new map atomically (§4.F, §5, §9).
pub fn refresh(doc: &str) -> Result<(), quick_xml::Error> {
    let inner = parse_document(doc)?;
    let count = inner.by_id.len();
    *REGISTRY.inner.write().unwrap() = Arc::new(inner);
    debug!(count, "tag registry refreshed");
    Ok(())
}

/// Locate [`DEFAULT_TAGS_FILE_NAME`] in the current working directory,
/// falling back to the bundled document when no such file exists (§6), and
/// refresh the registry from whichever document was found.
pub fn load_default() -> Result<(), LoadError> {
    let dir = std::env::current_dir().unwrap_or_default();
    load_from_dir(dir, DEFAULT_TAGS_FILE_NAME)
}

/// As [`load_default`], but searching `dir` for `file_name` rather than the
/// process's actual working directory. This is the seam that makes the
/// working-directory lookup rule testable without mutating global process
/// state.
pub fn load_from_dir(dir: impl AsRef<Path>, file_name: &str) -> Result<(), LoadError> {
    let candidate = dir.as_ref().join(file_name);
    let doc = match std::fs::read_to_string(&candidate) {
        Ok(contents) => {
            debug!(path = %candidate.display(), "loaded tag-definition document from working directory");
            contents
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no {file_name} in working directory, falling back to bundled tag-definition document");
            pqdif_dictionary_std::DEFAULT_TAGS_XML.to_string()
        }
        Err(source) => return Err(LoadError::Read { path: candidate, source }),
    };
    refresh(&doc).context(ParseSnafu)
}

/// Load the tag-definition document from an explicit path, bypassing the
/// working-directory / bundled lookup order of §6 entirely. This is the
/// override a caller supplies via
/// [`PhysicalReaderOptions`](crate::sequencer)-style configuration (§4.J)
/// when it knows exactly which document to use. Unlike [`load_from_dir`],
/// a missing file here is always an error — there is no further fallback
/// once the caller has named a specific path.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    let doc = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded tag-definition document from explicit path");
    refresh(&doc).context(ParseSnafu)
}

#[derive(Default)]
struct PartialTag {
    id: Option<String>,
    name: Option<String>,
    standard_name: Option<String>,
    description: Option<String>,
    element_type: Option<String>,
    physical_type: Option<String>,
    required: Option<String>,
    format_string: Option<String>,
}

#[derive(Default)]
struct PartialEntry {
    name: Option<String>,
    standard_name: Option<String>,
    value: Option<String>,
    description: Option<String>,
}

fn parse_document(doc: &str) -> Result<Inner, quick_xml::Error> {
    let mut reader = Reader::from_str(doc);
    let mut buf = Vec::new();

    let mut tags: Vec<TagInfo> = Vec::new();
    let mut value_lists: HashMap<String, Vec<IdentifierEntry>> = HashMap::new();

    let mut in_tag = false;
    let mut tag = PartialTag::default();

    let mut tag_values_key = String::new();
    let mut tag_values_entries: Vec<IdentifierEntry> = Vec::new();

    let mut in_entry = false;
    let mut entry = PartialEntry::default();

    let mut current_field: Option<Vec<u8>> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => match e.local_name().as_ref() {
                b"tag" => {
                    in_tag = true;
                    tag = PartialTag::default();
                }
                b"tagValues" => {
                    tag_values_entries = Vec::new();
                    tag_values_key = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"standardName")
                        .map(|a| a.unescape_value().unwrap_or_default().into_owned())
                        .unwrap_or_default();
                }
                b"entry" => {
                    in_entry = true;
                    entry = PartialEntry::default();
                }
                other => current_field = Some(other.to_vec()),
            },
            Event::Text(t) => {
                if let Some(field) = &current_field {
                    let text = t.unescape()?.into_owned();
                    if in_entry {
                        match field.as_slice() {
                            b"name" => entry.name = Some(text),
                            b"standardName" => entry.standard_name = Some(text),
                            b"value" => entry.value = Some(text),
                            b"description" => entry.description = Some(text),
                            _ => {}
                        }
                    } else if in_tag {
                        match field.as_slice() {
                            b"id" => tag.id = Some(text),
                            b"name" => tag.name = Some(text),
                            b"standardName" => tag.standard_name = Some(text),
                            b"description" => tag.description = Some(text),
                            b"elementType" => tag.element_type = Some(text),
                            b"physicalType" => tag.physical_type = Some(text),
                            b"required" => tag.required = Some(text),
                            b"formatString" => tag.format_string = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tag" => {
                    in_tag = false;
                    if let Some(built) = finish_tag(&tag) {
                        tags.push(built);
                    } else {
                        warn!(name = ?tag.name, "dropping incomplete <tag> entry");
                    }
                }
                b"entry" => {
                    in_entry = false;
                    if let Some(built) = finish_entry(&entry) {
                        tag_values_entries.push(built);
                    }
                }
                b"tagValues" => {
                    value_lists.insert(std::mem::take(&mut tag_values_key), std::mem::take(&mut tag_values_entries));
                }
                _ => current_field = None,
            },
            _ => {}
        }
        buf.clear();
    }

    let mut by_id = HashMap::with_capacity(tags.len());
    for mut t in tags {
        if let Some(key) = value_list_key(&t.name) {
            if let Some(entries) = value_lists.get(&key) {
                t.identifiers = entries.clone();
            }
        }
        by_id.insert(t.id, Arc::new(t));
    }

    Ok(Inner { by_id })
}

/// The `<tagValues standardName="…">` key a tag's enumerated values are
/// filed under: the tag's own short name with a trailing `ID` dropped
/// (e.g. `QuantityTypeID` → `QuantityType`), or the name itself when it
/// does not end in `ID`.
fn value_list_key(tag_name: &str) -> Option<String> {
    Some(tag_name.strip_suffix("ID").unwrap_or(tag_name).to_string())
}

fn finish_tag(t: &PartialTag) -> Option<TagInfo> {
    Some(TagInfo {
        id: Identifier::from_str(t.id.as_deref()?).ok()?,
        name: t.name.clone()?,
        standard_name: t.standard_name.clone().unwrap_or_default(),
        description: t.description.clone().unwrap_or_default(),
        element_kind: ElementKind::parse(t.element_type.as_deref()?)?,
        physical_type: parse_physical_type(t.physical_type.as_deref()?)?,
        required: t.required.as_deref() == Some("true"),
        format_string: t.format_string.clone(),
        identifiers: Vec::new(),
    })
}

fn finish_entry(e: &PartialEntry) -> Option<IdentifierEntry> {
    Some(IdentifierEntry {
        name: e.name.clone()?,
        standard_name: e.standard_name.clone().unwrap_or_default(),
        value: Identifier::from_str(e.value.as_deref()?).ok()?,
        description: e.description.clone().unwrap_or_default(),
    })
}

fn parse_physical_type(s: &str) -> Option<PhysicalType> {
    PhysicalType::ALL.into_iter().find(|t| format!("{t:?}") == s)
}
