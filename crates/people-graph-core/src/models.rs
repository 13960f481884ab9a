//! Typed view of one scraped-profile record.
//!
//! Every field is optional: the export omits keys freely and uses `null` for
//! empty arrays. Fields whose upstream type is unreliable (`connections`,
//! `languages`) are kept as raw JSON and narrowed through accessors, matching
//! how the import treats them. Anything else with the wrong type fails
//! deserialization and the line is skipped.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::RecordError;

/// One person profile, one line of the input file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub public_identifier: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub connections: Option<Value>,
    #[serde(default)]
    pub experiences: Option<Vec<Experience>>,
    #[serde(default)]
    pub languages: Option<Vec<Value>>,
    #[serde(default)]
    pub education: Option<Vec<Education>>,
    #[serde(default)]
    pub accomplishment_projects: Option<Vec<Project>>,
}

/// A single position held at a company.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub company_linkedin_profile_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateParts>,
    #[serde(default)]
    pub ends_at: Option<DateParts>,
}

/// A single education entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub school_linkedin_profile_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub degree_name: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateParts>,
    #[serde(default)]
    pub ends_at: Option<DateParts>,
}

/// An accomplishment project. Only the description is used, for skills.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Year/month/day triple as exported; any part may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateParts {
    #[serde(default)]
    pub day: Option<i64>,
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub year: Option<i64>,
}

impl DateParts {
    /// Full calendar date, only when all three parts are present and valid.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let (year, month, day) = (self.year?, self.month?, self.day?);
        NaiveDate::from_ymd_opt(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
            u32::try_from(day).ok()?,
        )
    }

    /// `year`, `month`, `day` rendered for key derivation; absent parts are empty.
    pub fn key_parts(parts: Option<&DateParts>) -> [String; 3] {
        let render = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
        match parts {
            Some(p) => [render(p.year), render(p.month), render(p.day)],
            None => [String::new(), String::new(), String::new()],
        }
    }
}

/// Result of parsing one input line.
#[derive(Debug)]
pub enum ParsedLine {
    /// `null` or `{}`: nothing to import.
    Empty,
    Record(Box<PersonRecord>),
}

impl PersonRecord {
    /// Parse one JSON line. Non-object values are rejected.
    pub fn parse_line(line: &str) -> Result<ParsedLine, RecordError> {
        let value: Value = serde_json::from_str(line)?;
        match value {
            Value::Null => Ok(ParsedLine::Empty),
            Value::Object(map) if map.is_empty() => Ok(ParsedLine::Empty),
            Value::Object(map) => {
                let record: PersonRecord = serde_json::from_value(Value::Object(map))?;
                Ok(ParsedLine::Record(Box::new(record)))
            }
            _ => Err(RecordError::NotAnObject),
        }
    }

    /// Connection count, kept only when the export carries an integer.
    pub fn connections(&self) -> Option<i64> {
        self.connections.as_ref().and_then(Value::as_i64)
    }

    pub fn experiences(&self) -> &[Experience] {
        self.experiences.as_deref().unwrap_or_default()
    }

    pub fn education(&self) -> &[Education] {
        self.education.as_deref().unwrap_or_default()
    }

    pub fn projects(&self) -> &[Project] {
        self.accomplishment_projects.as_deref().unwrap_or_default()
    }

    /// Language names; non-string entries are ignored.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
    }
}
