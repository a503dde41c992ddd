use std::fmt;

use bookshelf_db::RowId;
use serde::{Deserialize, Serialize};
use time::Date;

pub const TITLE_MAX_LEN: usize = 50;
pub const ISBN_MAX_LEN: usize = 255;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// `PublishDate` is written as `YYYY-MM-DD`. Reads also take a date-time
/// (with or without offset) and keep only its calendar date.
mod publish_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::{
        format_description::well_known::Rfc3339, macros::format_description, Date,
        OffsetDateTime, PrimitiveDateTime,
    };

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        super::iso_date::serialize(date, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            de::Error::custom(format!(
                "invalid PublishDate '{}', expected YYYY-MM-DD",
                raw
            ))
        })
    }

    pub(super) fn parse(raw: &str) -> Option<Date> {
        if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
            return Some(date);
        }

        let local = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        );
        if let Ok(datetime) = PrimitiveDateTime::parse(raw, local) {
            return Some(datetime.date());
        }

        OffsetDateTime::parse(raw, &Rfc3339)
            .ok()
            .map(|datetime| datetime.date())
    }
}

/// A book as held by the catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Book {
    /// Assigned by the table on creation, never changed afterwards
    pub id: RowId,
    pub title: String,
    pub author: String,
    #[serde(with = "publish_date")]
    pub publish_date: Date,
    #[serde(rename = "ISBN", default)]
    pub isbn: Option<String>,
    /// Available copies
    pub nbr_of_copy: i32,
}

impl Book {
    /// Overwrite every field except the id.
    pub fn apply(&mut self, dto: BookDto) {
        self.title = dto.title;
        self.author = dto.author;
        self.publish_date = dto.publish_date;
        self.isbn = dto.isbn;
        self.nbr_of_copy = dto.nbr_of_copy;
    }
}

/// Create/update payload: a book without its id.
///
/// Missing `Title`/`Author` deserialize to empty strings so that
/// [`BookDto::validate`] reports them alongside any other violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BookDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(with = "publish_date")]
    pub publish_date: Date,
    #[serde(rename = "ISBN", default)]
    pub isbn: Option<String>,
    pub nbr_of_copy: i32,
}

impl BookDto {
    /// Check required fields and length limits, collecting every violation.
    pub fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push(Violation::required("Title"));
        } else if self.title.chars().count() > TITLE_MAX_LEN {
            violations.push(Violation::too_long("Title", TITLE_MAX_LEN));
        }

        if self.author.trim().is_empty() {
            violations.push(Violation::required("Author"));
        }

        if let Some(isbn) = &self.isbn {
            if isbn.chars().count() > ISBN_MAX_LEN {
                violations.push(Violation::too_long("ISBN", ISBN_MAX_LEN));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn into_book(self, id: RowId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publish_date: self.publish_date,
            isbn: self.isbn,
            nbr_of_copy: self.nbr_of_copy,
        }
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub rule: Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Rule {
    Required,
    MaxLength { max: usize },
}

impl Violation {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            rule: Rule::Required,
        }
    }

    pub fn too_long(field: &'static str, max: usize) -> Self {
        Self {
            field,
            rule: Rule::MaxLength { max },
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::Required => write!(f, "{} is required", self.field),
            Rule::MaxLength { max } => {
                write!(f, "{} must be at most {} characters", self.field, max)
            }
        }
    }
}

/// Human-readable form of each violation, in order.
pub fn describe(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}
