//! Identity normalizer: one [`PersonRecord`] in, every graph fact out.
//!
//! All keys are derived from natural keys (URLs, names, dates) by
//! [`hash_string`], so the same record always produces the same ids and a
//! second import merges into the nodes of the first. Skills are the
//! exception and are keyed by [`slugify`] of their display name.
//!
//! Normalization is pure and finishes before anything is written: a record
//! missing a required field yields an error and no facts at all.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::RecordError;
use crate::hash::{hash_string, is_none_sentinel, slugify};
use crate::models::{DateParts, Education, Experience, PersonRecord};
use crate::skills::SkillVocabulary;

/// Location used when an experience has none.
pub const UNKNOWN_LOCATION: &str = "UNKNOWN";

const PROFILE_URL_PREFIX: &str = "https://www.linkedin.com/in/";

/// `Person` node. Properties are written only when the node is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonNode {
    pub id: String,
    /// Natural key the id was hashed from.
    pub url: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub profile_pic_url: Option<String>,
    pub occupation: Option<String>,
    pub headline: Option<String>,
    pub connections: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyNode {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub logo: Option<String>,
}

/// `CompanyLocation` node; its id also keys the `HAS_BRANCH` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationNode {
    pub id: String,
    pub name: String,
}

/// Start and end of a relationship; each is set only when fully known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tenure {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// `WORKS_FOR` (Person → Company).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksFor {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tenure: Tenure,
}

/// `WORKS_AT` (Person → CompanyLocation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksAt {
    pub id: String,
    pub tenure: Tenure,
}

/// Everything one experience contributes to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employment {
    pub company: CompanyNode,
    pub location: LocationNode,
    pub works_for: WorksFor,
    pub works_at: WorksAt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolNode {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub logo: Option<String>,
}

/// `STUDY_AT` (Person → School).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyAt {
    pub id: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub description: Option<String>,
    pub tenure: Tenure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Study {
    pub school: SchoolNode,
    pub study_at: StudyAt,
}

/// `Language` node reached through `SPEAKS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFact {
    pub id: String,
    pub name: String,
}

/// `Skill` node reached through `HAS_SKILL`. The id is a slug, not a hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SkillFact {
    pub id: String,
    pub name: String,
}

/// All facts derived from one record, in write order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFacts {
    pub person: PersonNode,
    pub employments: Vec<Employment>,
    pub languages: Vec<LanguageFact>,
    pub studies: Vec<Study>,
    pub skills: BTreeSet<SkillFact>,
}

/// Derive every node and relationship key for one record.
pub fn normalize(
    record: &PersonRecord,
    vocabulary: &SkillVocabulary,
) -> Result<RecordFacts, RecordError> {
    let person_key = person_natural_key(record)?;
    let person = PersonNode {
        id: hash_string(&person_key),
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        full_name: record.full_name.clone(),
        profile_pic_url: record.profile_pic_url.clone(),
        occupation: record.occupation.clone(),
        headline: record.headline.clone(),
        connections: record.connections(),
        url: person_key,
    };

    let mut skill_names = BTreeSet::new();

    let mut employments = Vec::with_capacity(record.experiences().len());
    for experience in record.experiences() {
        employments.push(employment(experience, &person.url)?);
        if let Some(description) = non_empty(&experience.description) {
            skill_names.extend(vocabulary.extract(description));
        }
    }

    let languages = record.languages().map(language).collect();

    let studies = record
        .education()
        .iter()
        .map(study)
        .collect::<Result<Vec<_>, _>>()?;

    for project in record.projects() {
        if let Some(description) = non_empty(&project.description) {
            skill_names.extend(vocabulary.extract(description));
        }
    }

    let skills = skill_names.into_iter().map(skill).collect();

    Ok(RecordFacts {
        person,
        employments,
        languages,
        studies,
        skills,
    })
}

/// Canonical profile URL, or the picture URL when the public identifier is
/// missing or the `"none"` placeholder.
pub fn person_natural_key(record: &PersonRecord) -> Result<String, RecordError> {
    match record.public_identifier.as_deref() {
        Some(public_id) if !public_id.trim().is_empty() && !is_none_sentinel(public_id) => {
            Ok(format!("{PROFILE_URL_PREFIX}{public_id}"))
        }
        _ => non_empty(&record.profile_pic_url)
            .map(str::to_string)
            .ok_or(RecordError::MissingField("public_identifier or profile_pic_url")),
    }
}

/// Profile URL when usable, otherwise the entity name.
fn organization_natural_key<'a>(url: &'a Option<String>, name: &'a str) -> &'a str {
    match non_empty(url) {
        Some(url) if !is_none_sentinel(url) => url,
        _ => name,
    }
}

fn employment(experience: &Experience, person_key: &str) -> Result<Employment, RecordError> {
    let company_name = experience
        .company
        .as_deref()
        .ok_or(RecordError::MissingField("experiences[].company"))?;

    let location = non_empty(&experience.location).unwrap_or(UNKNOWN_LOCATION);
    let location_id = hash_string(&slugify(location));

    let [year, month, day] = DateParts::key_parts(experience.starts_at.as_ref());
    let title = non_empty(&experience.title).unwrap_or_default();
    let works_for_key = [year.as_str(), month.as_str(), day.as_str(), company_name, title].join(":");
    let works_at_key = [location, company_name, person_key].join(":");

    let tenure = tenure(&experience.starts_at, &experience.ends_at);

    Ok(Employment {
        company: CompanyNode {
            id: hash_string(organization_natural_key(
                &experience.company_linkedin_profile_url,
                company_name,
            )),
            name: company_name.trim().to_string(),
            url: experience.company_linkedin_profile_url.clone(),
            logo: experience.logo_url.clone(),
        },
        location: LocationNode {
            id: location_id,
            name: location.to_string(),
        },
        works_for: WorksFor {
            id: hash_string(&works_for_key),
            title: non_empty(&experience.title).map(str::to_string),
            description: non_empty(&experience.description).map(str::to_string),
            tenure,
        },
        works_at: WorksAt {
            id: hash_string(&works_at_key),
            tenure,
        },
    })
}

fn study(education: &Education) -> Result<Study, RecordError> {
    let school_name = education
        .school
        .as_deref()
        .ok_or(RecordError::MissingField("education[].school"))?;

    let [year, month, day] = DateParts::key_parts(education.starts_at.as_ref());
    let degree = non_empty(&education.degree_name).unwrap_or_default();
    let study_key = [year.as_str(), month.as_str(), day.as_str(), school_name, degree].join(":");

    Ok(Study {
        school: SchoolNode {
            id: hash_string(organization_natural_key(
                &education.school_linkedin_profile_url,
                school_name,
            )),
            name: school_name.trim().to_string(),
            url: education.school_linkedin_profile_url.clone(),
            logo: education.logo_url.clone(),
        },
        study_at: StudyAt {
            id: hash_string(&study_key),
            degree: non_empty(&education.degree_name).map(str::to_string),
            field: non_empty(&education.field_of_study).map(str::to_string),
            description: non_empty(&education.description).map(str::to_string),
            tenure: tenure(&education.starts_at, &education.ends_at),
        },
    })
}

fn language(name: &str) -> LanguageFact {
    LanguageFact {
        id: hash_string(&name.trim().to_lowercase()),
        name: name.to_string(),
    }
}

fn skill(name: String) -> SkillFact {
    SkillFact {
        id: slugify(&name),
        name,
    }
}

fn tenure(starts_at: &Option<DateParts>, ends_at: &Option<DateParts>) -> Tenure {
    Tenure {
        start: starts_at.as_ref().and_then(DateParts::to_date),
        end: ends_at.as_ref().and_then(DateParts::to_date),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
