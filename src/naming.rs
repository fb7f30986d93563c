use std::ffi::OsStr;

use serde::Deserialize;

use crate::errors::BenchError;
use crate::types::{Field, RunId};

/// How run parameters are embedded in log filenames.
///
/// A name looks like `n<N>-k<K>-r<R>.<extension>`: one numeric group per entry
/// of `fields`, in that order, separated by `-`. Alphabetic prefixes in front of
/// each number are decoration and are discarded when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NamingScheme {
    pub extension: String,
    pub fields: Vec<Field>,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self {
            extension: "clog".to_string(),
            fields: vec![Field::N, Field::K, Field::R],
        }
    }
}

impl NamingScheme {
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.extension.is_empty() || self.extension.contains('.') {
            return Err(BenchError::ConfigInvalid {
                detail: format!(
                    "extension must be non-empty and contain no '.', got {:?}",
                    self.extension
                ),
            });
        }

        for field in [Field::N, Field::K, Field::R] {
            let count = self.fields.iter().filter(|f| **f == field).count();
            if count != 1 {
                return Err(BenchError::ConfigInvalid {
                    detail: format!(
                        "fields must name n, k and r exactly once, '{}' appears {} times",
                        field.prefix(),
                        count
                    ),
                });
            }
        }

        Ok(())
    }

    /// Number of numeric groups a stem must reduce to.
    pub fn group_count(&self) -> usize {
        self.fields.len()
    }

    /// True when the text after the final `.` equals the extension exactly.
    ///
    /// Compared byte for byte, so names that are not valid UTF-8 still match.
    pub fn matches(&self, file_name: impl AsRef<OsStr>) -> bool {
        let bytes = file_name.as_ref().as_encoded_bytes();
        match bytes.iter().rposition(|b| *b == b'.') {
            Some(dot) => &bytes[dot + 1..] == self.extension.as_bytes(),
            None => false,
        }
    }

    /// Filename without its final extension.
    pub fn stem<'a>(&self, file_name: &'a str) -> &'a str {
        file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file_name)
    }

    /// Decode the run parameters embedded in an extension-stripped stem.
    pub fn decode(&self, stem: &str) -> Result<RunId, BenchError> {
        let digits = strip_alphabetic(stem);
        let tokens: Vec<&str> = digits.split('-').collect();

        let fail = |detail: String| BenchError::FilenameParse {
            name: stem.to_string(),
            detail,
        };

        if tokens.len() != self.group_count() {
            return Err(fail(format!(
                "expected {} hyphen-separated numbers, found {} in {:?}",
                self.group_count(),
                tokens.len(),
                digits
            )));
        }

        let mut run = RunId::new(0, 0, 0);
        for (field, token) in self.fields.iter().zip(&tokens) {
            if token.is_empty() {
                return Err(fail(format!(
                    "missing number for '{}' in {:?}",
                    field.prefix(),
                    digits
                )));
            }
            let value: u64 = token.parse().map_err(|e| {
                fail(format!(
                    "'{}' value {:?} is not a non-negative integer: {}",
                    field.prefix(),
                    token,
                    e
                ))
            })?;
            run.set(*field, value);
        }

        Ok(run)
    }

    /// Encode a run as a full filename, e.g. `n8-k0-r3.clog`.
    pub fn encode(&self, run: &RunId) -> String {
        let groups: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{}{}", f.prefix(), run.get(*f)))
            .collect();
        format!("{}.{}", groups.join("-"), self.extension)
    }
}

/// Remove every run of ASCII letters, leaving digits, separators and anything else.
fn strip_alphabetic(stem: &str) -> String {
    stem.chars().filter(|c| !c.is_ascii_alphabetic()).collect()
}
