use std::collections::HashMap;

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use crate::catalog::{EntityKind, SchemaSet};
use crate::domain::ObjectSchema;
use crate::error::{SchemaError, SchemaResult, ValidationError, VariantFailure, Violation};
use crate::normalize::normalize_tags;

/// Longest rendering of an offending value kept in a diagnostic.
const MAX_ACTUAL_CHARS: usize = 80;

/// A payload that matched one of its kind's variants in full.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedEntity {
    pub kind: EntityKind,
    /// Name of the variant that matched.
    pub variant: String,
    /// The payload exactly as received.
    pub value: Value,
}

struct CompiledVariant {
    name: String,
    schema: ObjectSchema,
    validator: Validator,
}

/// Validates untyped JSON against the ordered variant lists of a
/// [`SchemaSet`].
///
/// Field tables are compiled to JSON Schema once, at construction. The
/// validator is `Send + Sync` and meant to be shared.
pub struct SchemaValidator {
    kinds: HashMap<EntityKind, Vec<CompiledVariant>>,
}

impl SchemaValidator {
    /// Validator over the built-in tables.
    pub fn new() -> SchemaResult<Self> {
        Self::compile(&SchemaSet::builtin())
    }

    /// Validator over a caller-supplied (e.g. widened) set.
    pub fn compile(set: &SchemaSet) -> SchemaResult<Self> {
        let mut kinds = HashMap::new();
        for kind in set.kinds() {
            let mut compiled = Vec::new();
            for variant in set.variants(kind) {
                let json_schema = variant.schema.to_json_schema();
                let mut opts = jsonschema::options();
                opts.with_draft(jsonschema::Draft::Draft202012);
                let validator = opts.build(&json_schema).map_err(|e| SchemaError::Compile {
                    kind,
                    variant: variant.name.clone(),
                    reason: e.to_string(),
                })?;
                compiled.push(CompiledVariant {
                    name: variant.name.clone(),
                    schema: variant.schema.clone(),
                    validator,
                });
            }
            kinds.insert(kind, compiled);
        }
        Ok(Self { kinds })
    }

    /// Variant names for `kind`, in the order they are tried.
    pub fn variant_names(&self, kind: EntityKind) -> Vec<&str> {
        self.kinds
            .get(&kind)
            .map(|vs| vs.iter().map(|v| v.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Validate `payload` as `kind`.
    ///
    /// Variants are tried in priority order and the first full match wins.
    /// On total failure the error lists every variant's violations.
    pub fn validate(
        &self,
        kind: EntityKind,
        payload: Value,
    ) -> Result<ValidatedEntity, ValidationError> {
        let variants = match self.kinds.get(&kind) {
            Some(vs) if !vs.is_empty() => vs,
            _ => return Err(ValidationError::NoVariants(kind)),
        };

        let mut failures = Vec::with_capacity(variants.len());
        for variant in variants {
            if variant.validator.is_valid(&payload) {
                debug!(%kind, variant = %variant.name, "payload validated");
                return Ok(ValidatedEntity {
                    kind,
                    variant: variant.name.clone(),
                    value: payload,
                });
            }
            failures.push(VariantFailure {
                variant: variant.name.clone(),
                violations: violations(variant, &payload),
            });
        }

        debug!(%kind, tried = failures.len(), "payload matched no variant");
        Err(ValidationError::NoVariantMatched { kind, failures })
    }

    /// Rewrite legacy tag arrays into structured tags, then validate.
    ///
    /// This is the only path that changes a payload; `timestamp` is stamped
    /// on every rewritten tag.
    pub fn validate_normalized(
        &self,
        kind: EntityKind,
        payload: &Value,
        timestamp: u64,
    ) -> Result<ValidatedEntity, ValidationError> {
        self.validate(kind, normalize_tags(payload, timestamp))
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self
            .kinds
            .iter()
            .map(|(k, vs)| (*k, vs.iter().map(|v| v.name.as_str()).collect::<Vec<_>>()))
            .collect();
        kinds.sort();
        f.debug_struct("SchemaValidator").field("kinds", &kinds).finish()
    }
}

fn violations(variant: &CompiledVariant, payload: &Value) -> Vec<Violation> {
    let mut out = Vec::new();
    for error in variant.validator.iter_errors(payload) {
        let base = error.instance_path.to_string();
        let message = error.to_string();
        match &error.kind {
            ValidationErrorKind::Required { property } => {
                let name = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                let path = format!("{base}/{}", escape_segment(&name));
                out.push(Violation {
                    expected: expected_at(&variant.schema, &path),
                    actual: "missing".into(),
                    path,
                    message,
                });
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                for key in unexpected {
                    let path = format!("{base}/{}", escape_segment(key));
                    out.push(Violation {
                        expected: "no such field".into(),
                        actual: actual_at(payload, &path),
                        path,
                        message: message.clone(),
                    });
                }
            }
            _ => out.push(Violation {
                expected: expected_at(&variant.schema, &base),
                actual: actual_at(payload, &base),
                path: base,
                message,
            }),
        }
    }
    out
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn expected_at(schema: &ObjectSchema, path: &str) -> String {
    if path.is_empty() {
        return "object".into();
    }
    let segments: Vec<String> = path.split('/').skip(1).map(unescape_segment).collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    schema
        .describe_path(&segments)
        .unwrap_or_else(|| "a value allowed by the schema".into())
}

fn actual_at(payload: &Value, path: &str) -> String {
    match payload.pointer(path) {
        None => "missing".into(),
        Some(value) => {
            let rendered = value.to_string();
            if rendered.chars().count() > MAX_ACTUAL_CHARS {
                let cut: String = rendered.chars().take(MAX_ACTUAL_CHARS).collect();
                format!("{cut}...")
            } else {
                rendered
            }
        }
    }
}
