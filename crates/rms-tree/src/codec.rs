//! Encoding and decoding of the collection index text format.

use std::collections::HashSet;

use rms_types::{Hash, SchemaVersion};

use crate::entry::{CollectionEntry, EntryKind, FIELD_DELIMITER};
use crate::error::{TreeError, TreeResult};

/// Number of fields on every entry line.
const ENTRY_FIELDS: usize = 5;

/// Hash field of the v4 summary line.
const SUMMARY_HASH: &str = "0";
/// Id field of the v4 summary line.
const SUMMARY_ID: &str = ".";

/// A decoded index, entries in wire order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedIndex {
    pub version: SchemaVersion,
    pub entries: Vec<CollectionEntry>,
}

/// Encode entries into the canonical index representation.
///
/// Entries are written sorted by id regardless of input order. Fails if any
/// id is unrepresentable or repeated.
pub fn encode(version: SchemaVersion, entries: &[CollectionEntry]) -> TreeResult<Vec<u8>> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        CollectionEntry::validate_id(&entry.id)?;
        if !seen.insert(entry.id.as_str()) {
            return Err(TreeError::DuplicateId(entry.id.clone()));
        }
    }
    if total_size(entries).is_none() {
        return Err(TreeError::SizeOverflow);
    }
    let mut sorted: Vec<&CollectionEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(encode_sorted(version, sorted))
}

/// Sum of entry sizes, or `None` if it does not fit in a `u64`.
pub(crate) fn total_size<'a>(
    entries: impl IntoIterator<Item = &'a CollectionEntry>,
) -> Option<u64> {
    entries
        .into_iter()
        .try_fold(0u64, |total, e| total.checked_add(e.size))
}

/// Encode entries that are already validated, in canonical order, and whose
/// sizes sum without overflow.
pub(crate) fn encode_sorted<'a>(
    version: SchemaVersion,
    entries: impl IntoIterator<Item = &'a CollectionEntry> + Clone,
) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&version.to_string());
    out.push('\n');
    if version == SchemaVersion::V4 {
        let (count, size) = entries
            .clone()
            .into_iter()
            .fold((0u64, 0u64), |(n, s), e| (n + 1, s.saturating_add(e.size)));
        out.push_str(&format!(
            "{SUMMARY_HASH}{FIELD_DELIMITER}{SUMMARY_ID}{FIELD_DELIMITER}{count}{FIELD_DELIMITER}{size}\n"
        ));
    }
    for entry in entries {
        entry.write_line(&mut out);
    }
    out.into_bytes()
}

/// Decode an index. Strict: any malformed line fails the whole decode.
pub fn decode(bytes: &[u8]) -> TreeResult<DecodedIndex> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| TreeError::malformed(0, format!("not valid UTF-8: {e}")))?;
    let body = text.strip_suffix('\n').unwrap_or(text);
    let mut lines = body.split('\n').enumerate().map(|(i, l)| (i + 1, l));

    let version = match lines.next() {
        Some((_, header)) if !header.is_empty() => parse_version(header)?,
        _ => return Err(TreeError::malformed(1, "missing version header")),
    };

    let summary = if version == SchemaVersion::V4 {
        match lines.next() {
            Some((n, line)) => Some((n, parse_summary(n, line)?)),
            None => return Err(TreeError::malformed(2, "missing summary line")),
        }
    } else {
        None
    };

    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut actual_size = 0u64;
    for (n, line) in lines {
        let entry = parse_entry(n, line)?;
        if !seen.insert(entry.id.clone()) {
            return Err(TreeError::malformed(n, format!("duplicate id {}", entry.id)));
        }
        actual_size = actual_size.checked_add(entry.size).ok_or_else(|| {
            let line = summary.as_ref().map_or(n, |(summary_line, _)| *summary_line);
            TreeError::malformed(line, "entry sizes overflow a 64-bit total")
        })?;
        entries.push(entry);
    }

    if let Some((n, (count, size))) = summary {
        if count != entries.len() as u64 || size != actual_size {
            return Err(TreeError::malformed(
                n,
                format!(
                    "summary claims {count} entries / {size} bytes, found {} / {actual_size}",
                    entries.len()
                ),
            ));
        }
    }

    Ok(DecodedIndex { version, entries })
}

fn parse_version(header: &str) -> TreeResult<SchemaVersion> {
    let raw = parse_number(1, "version header", header)?;
    SchemaVersion::try_from(raw)
        .map_err(|_| TreeError::malformed(1, format!("unrecognized schema version {raw}")))
}

fn parse_summary(n: usize, line: &str) -> TreeResult<(u64, u64)> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    match fields.as_slice() {
        [SUMMARY_HASH, SUMMARY_ID, count, size] => Ok((
            parse_number(n, "entry count", count)?,
            parse_number(n, "total size", size)?,
        )),
        _ => Err(TreeError::malformed(n, format!("bad summary line {line:?}"))),
    }
}

fn parse_entry(n: usize, line: &str) -> TreeResult<CollectionEntry> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() != ENTRY_FIELDS {
        return Err(TreeError::malformed(
            n,
            format!("expected {ENTRY_FIELDS} fields, found {}", fields.len()),
        ));
    }
    let hash = Hash::from_hex(fields[0])
        .map_err(|e| TreeError::malformed(n, format!("bad hash: {e}")))?;
    let kind = EntryKind::from_flag(fields[1])
        .ok_or_else(|| TreeError::malformed(n, format!("unknown kind flag {:?}", fields[1])))?;
    let id = fields[2];
    if id.is_empty() {
        return Err(TreeError::malformed(n, "empty id"));
    }
    let subfile_count = parse_number(n, "subfile count", fields[3])?;
    let size = parse_number(n, "size", fields[4])?;
    Ok(CollectionEntry::new(hash, kind, id, subfile_count, size))
}

// Only the form the encoder writes is accepted: `u64::from_str` would also
// take a leading '+' or leading zeros, and neither survives re-encoding.
fn parse_number(n: usize, what: &str, raw: &str) -> TreeResult<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TreeError::malformed(n, format!("{what} {raw:?} is not a number")));
    }
    if raw.len() > 1 && raw.starts_with('0') {
        return Err(TreeError::malformed(n, format!("{what} {raw:?} has leading zeros")));
    }
    raw.parse()
        .map_err(|e| TreeError::malformed(n, format!("{what} {raw:?}: {e}")))
}
