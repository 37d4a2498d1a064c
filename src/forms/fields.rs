//! Field tables and client-side validation.
//!
//! Each resource describes its form as a static table of `FieldSpec`s. A field reader
//! returns the trimmed value as text, or `None` when the field is empty.

use std::fmt::{self, Display};

use chrono::NaiveDate;

/// How a field is presented and edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Date,
    Number,
    Select,
    Checkbox,
}

/// One entry of a form's field table.
pub struct FieldSpec<D> {
    /// Backend column name
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
    /// Values a select accepts, when the choices are fixed
    pub allowed: Option<&'static [&'static str]>,
    read: fn(&D) -> Option<String>,
}

impl<D> FieldSpec<D> {
    pub const fn required(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        read: fn(&D) -> Option<String>,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            max_len: None,
            allowed: None,
            read,
        }
    }

    pub const fn optional(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        read: fn(&D) -> Option<String>,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            max_len: None,
            allowed: None,
            read,
        }
    }

    /// Limit the value to `max` characters.
    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    /// Accept only one of `allowed`.
    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    /// Current value of this field in `draft`.
    pub fn value(&self, draft: &D) -> Option<String> {
        (self.read)(draft)
    }

    /// Check this field against `draft`.
    pub fn check(&self, draft: &D) -> Option<FieldError> {
        match self.value(draft) {
            None if self.required => Some(FieldError::Missing {
                field: self.name,
                label: self.label,
            }),
            Some(value) => match (self.max_len, self.allowed) {
                (Some(max), _) if value.chars().count() > max => Some(FieldError::TooLong {
                    field: self.name,
                    label: self.label,
                    max,
                }),
                (_, Some(allowed)) if !allowed.contains(&value.as_str()) => {
                    Some(FieldError::NotAllowed {
                        field: self.name,
                        label: self.label,
                        allowed,
                    })
                }
                _ => None,
            },
            None => None,
        }
    }
}

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Missing {
        field: &'static str,
        label: &'static str,
    },
    TooLong {
        field: &'static str,
        label: &'static str,
        max: usize,
    },
    NotAllowed {
        field: &'static str,
        label: &'static str,
        allowed: &'static [&'static str],
    },
}

impl FieldError {
    /// Backend column name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Missing { field, .. }
            | FieldError::TooLong { field, .. }
            | FieldError::NotAllowed { field, .. } => field,
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Missing { label, .. } => write!(f, "{} is required", label),
            FieldError::TooLong { label, max, .. } => {
                write!(f, "{} must be at most {} characters", label, max)
            }
            FieldError::NotAllowed { label, allowed, .. } => {
                write!(f, "{} must be one of: {}", label, allowed.join(", "))
            }
        }
    }
}

/// Run every check in `fields` against `draft`, in table order.
pub fn validate<D>(fields: &[FieldSpec<D>], draft: &D) -> Vec<FieldError> {
    fields.iter().filter_map(|field| field.check(draft)).collect()
}

pub fn text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn opt_text(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(text)
}

pub fn date(value: &Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn number<T: Display>(value: &Option<T>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

/// Checkboxes always have a value.
pub fn flag(value: bool) -> Option<String> {
    Some(if value { "Yes" } else { "No" }.to_string())
}
