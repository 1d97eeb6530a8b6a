//! Entity kinds and the built-in variant tables.
//!
//! Every accepted payload shape observed from the server is one row group
//! here. When a new server quirk shows up, widen the relevant field's
//! [`Domain`] or add a variant; validation code does not change.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Domain, FieldSpec, ObjectSchema};

/// The declared category of a JSON entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// `<id>.metadata`: name, parent, type and timestamps.
    Metadata,
    /// `<id>.content` of a document.
    DocumentContent,
    /// `<id>.content` of a folder.
    CollectionContent,
    /// Anything that parses as JSON. For payloads the caller has no table for.
    Any,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::DocumentContent => write!(f, "document content"),
            Self::CollectionContent => write!(f, "collection content"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// One named payload shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub name: String,
    pub schema: ObjectSchema,
}

impl Variant {
    pub fn new(name: impl Into<String>, schema: ObjectSchema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Ordered variant lists per entity kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaSet {
    variants: BTreeMap<EntityKind, Vec<Variant>>,
}

impl SchemaSet {
    /// A set with no variants at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shapes observed from current and legacy servers.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        set.push(EntityKind::Metadata, Variant::new("metadata", metadata()));
        set.push(
            EntityKind::DocumentContent,
            Variant::new("notebook-v2", notebook_v2()),
        );
        set.push(
            EntityKind::DocumentContent,
            Variant::new("notebook-v1", notebook_v1()),
        );
        set.push(
            EntityKind::DocumentContent,
            Variant::new("document", pdf_or_epub()),
        );
        set.push(
            EntityKind::DocumentContent,
            Variant::new("document-legacy-tags", legacy_tagged_document()),
        );
        set.push(
            EntityKind::CollectionContent,
            Variant::new("collection", collection_content(tag_objects())),
        );
        set.push(
            EntityKind::CollectionContent,
            Variant::new("collection-legacy-tags", collection_content(tag_strings())),
        );
        set.push(
            EntityKind::Any,
            Variant::new("any", ObjectSchema::permissive(vec![])),
        );
        set
    }

    /// Append a variant, tried after the existing ones.
    pub fn push(&mut self, kind: EntityKind, variant: Variant) -> &mut Self {
        self.variants.entry(kind).or_default().push(variant);
        self
    }

    /// Insert a variant ahead of the existing ones.
    pub fn prepend(&mut self, kind: EntityKind, variant: Variant) -> &mut Self {
        self.variants.entry(kind).or_default().insert(0, variant);
        self
    }

    /// Replace the variant named `name`; returns `false` if there is none.
    pub fn replace(&mut self, kind: EntityKind, variant: Variant) -> bool {
        let Some(list) = self.variants.get_mut(&kind) else {
            return false;
        };
        match list.iter_mut().find(|v| v.name == variant.name) {
            Some(slot) => {
                *slot = variant;
                true
            }
            None => false,
        }
    }

    /// Variants for `kind` in priority order.
    pub fn variants(&self, kind: EntityKind) -> &[Variant] {
        self.variants.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.variants.keys().copied()
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

fn metadata() -> ObjectSchema {
    ObjectSchema::strict(vec![
        FieldSpec::required("visibleName", Domain::String),
        FieldSpec::required("type", Domain::one_of(&["DocumentType", "CollectionType"])),
        // "" for the top level, "trash", or a folder id.
        FieldSpec::required("parent", Domain::String),
        FieldSpec::required("lastModified", Domain::DigitString),
        // Required on older servers, dropped by newer ones.
        FieldSpec::optional("pinned", Domain::Boolean),
        FieldSpec::optional("lastOpened", Domain::DigitString),
        FieldSpec::optional("lastOpenedPage", Domain::unsigned_or_unset()),
        FieldSpec::optional("createdTime", Domain::DigitString),
        FieldSpec::optional("deleted", Domain::Boolean),
        FieldSpec::optional("metadatamodified", Domain::Boolean),
        FieldSpec::optional("modified", Domain::Boolean),
        FieldSpec::optional("synced", Domain::Boolean),
        FieldSpec::optional("new", Domain::Boolean),
        FieldSpec::optional("version", Domain::unsigned()),
        FieldSpec::optional("source", Domain::String),
    ])
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

fn tag_objects() -> Domain {
    Domain::array_of(Domain::Object(ObjectSchema::strict(vec![
        FieldSpec::required("name", Domain::String),
        FieldSpec::required("timestamp", Domain::unsigned()),
    ])))
}

fn tag_strings() -> Domain {
    Domain::array_of(Domain::String)
}

fn page_tags() -> Domain {
    Domain::array_of(Domain::Object(ObjectSchema::strict(vec![
        FieldSpec::required("name", Domain::String),
        FieldSpec::required("pageId", Domain::String),
        FieldSpec::required("timestamp", Domain::unsigned()),
    ])))
}

/// `{"timestamp": "1:2", "value": ...}` cells used throughout `cPages`.
fn timestamped(value: Domain) -> Domain {
    Domain::Object(ObjectSchema::strict(vec![
        FieldSpec::required("timestamp", Domain::String),
        FieldSpec::required("value", value),
    ]))
}

fn cpages() -> Domain {
    let page = ObjectSchema::permissive(vec![
        FieldSpec::required("id", Domain::String),
        FieldSpec::optional("idx", timestamped(Domain::String)),
        FieldSpec::optional("template", timestamped(Domain::String)),
        FieldSpec::optional("redir", timestamped(Domain::unsigned_or_unset())),
        FieldSpec::optional("scrollTime", timestamped(Domain::String)),
        FieldSpec::optional("verticalScroll", timestamped(Domain::Number)),
        FieldSpec::optional("deleted", timestamped(Domain::unsigned())),
    ]);
    Domain::Object(ObjectSchema::strict(vec![
        FieldSpec::required("pages", Domain::array_of(Domain::Object(page))),
        FieldSpec::optional("original", timestamped(Domain::unsigned_or_unset())),
        // null once the document exists but has never been opened; absent
        // on documents that predate the field.
        FieldSpec::optional("lastOpened", timestamped(Domain::String)).nullable(),
        FieldSpec::optional(
            "uuids",
            Domain::array_of(Domain::Object(ObjectSchema::permissive(vec![]))),
        ),
    ]))
}

/// Fields shared by every document content variant.
fn content_common(file_types: &[&str], tags: Domain) -> ObjectSchema {
    ObjectSchema::strict(vec![
        FieldSpec::required("fileType", Domain::one_of(file_types)),
        // -1 means "open on the last visited page".
        FieldSpec::optional("coverPageNumber", Domain::unsigned_or_unset()),
        FieldSpec::optional(
            "documentMetadata",
            Domain::Object(ObjectSchema::permissive(vec![
                FieldSpec::optional("authors", Domain::array_of(Domain::String)),
                FieldSpec::optional("title", Domain::String),
                FieldSpec::optional("publisher", Domain::String),
                FieldSpec::optional("publicationDate", Domain::String),
            ])),
        ),
        FieldSpec::optional("extraMetadata", Domain::StringMap),
        FieldSpec::optional("fontName", Domain::String),
        FieldSpec::optional("formatVersion", Domain::unsigned()),
        FieldSpec::optional("lineHeight", Domain::unsigned_or_unset()),
        FieldSpec::optional("margins", Domain::unsigned()),
        FieldSpec::optional("orientation", Domain::one_of_or_empty(&["portrait", "landscape"])),
        // Counters once capped far too low; unbounded now.
        FieldSpec::optional("pageCount", Domain::unsigned()),
        FieldSpec::optional("originalPageCount", Domain::unsigned_or_unset()),
        FieldSpec::optional("pages", Domain::array_of(Domain::String)),
        FieldSpec::optional("redirectionPageMap", Domain::array_of(Domain::unsigned_or_unset())),
        FieldSpec::optional("sizeInBytes", Domain::DigitString),
        FieldSpec::optional("tags", tags),
        FieldSpec::optional("pageTags", page_tags()),
        FieldSpec::optional("textAlignment", Domain::one_of_or_empty(&["justify", "left"])),
        FieldSpec::optional("textScale", Domain::Number),
        FieldSpec::optional(
            "zoomMode",
            Domain::one_of(&["bestFit", "customFit", "fitToHeight", "fitToWidth"]),
        ),
        FieldSpec::optional("customZoomCenterX", Domain::Number),
        FieldSpec::optional("customZoomCenterY", Domain::Number),
        FieldSpec::optional("customZoomOrientation", Domain::one_of_or_empty(&["portrait", "landscape"])),
        FieldSpec::optional("customZoomPageHeight", Domain::Number),
        FieldSpec::optional("customZoomPageWidth", Domain::Number),
        FieldSpec::optional("customZoomScale", Domain::Number),
        FieldSpec::optional("dummyDocument", Domain::Boolean),
        FieldSpec::optional("keyboardMetadata", Domain::Object(ObjectSchema::permissive(vec![]))),
        FieldSpec::optional("transform", Domain::Object(ObjectSchema::permissive(vec![]))),
        FieldSpec::optional("cPages", cpages()),
    ])
}

fn notebook_v2() -> ObjectSchema {
    content_common(&["notebook"], tag_objects())
        .with_field(FieldSpec::required("formatVersion", Domain::exactly(2)))
        .with_field(FieldSpec::required("cPages", cpages()))
}

fn notebook_v1() -> ObjectSchema {
    content_common(&["notebook"], tag_objects())
        .with_field(FieldSpec::optional("formatVersion", Domain::exactly(1)))
        .with_field(FieldSpec::required("pages", Domain::array_of(Domain::String)))
}

fn pdf_or_epub() -> ObjectSchema {
    content_common(&["pdf", "epub"], tag_objects())
}

fn legacy_tagged_document() -> ObjectSchema {
    content_common(&["notebook", "pdf", "epub"], tag_strings())
        .with_field(FieldSpec::required("tags", tag_strings()))
}

fn collection_content(tags: Domain) -> ObjectSchema {
    ObjectSchema::strict(vec![FieldSpec::optional("tags", tags)])
}
