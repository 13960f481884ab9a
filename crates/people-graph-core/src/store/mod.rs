//! Graph storage abstraction for people-graph.
//!
//! The [`GraphStore`] trait has one method per write statement the import
//! issues. Each method is an idempotent merge keyed by the ids derived in
//! [`identity`](crate::identity): nodes are created if absent and their
//! properties set only on creation, relationships are merged by key and
//! their properties refreshed on every application.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::identity::{Employment, LanguageFact, PersonNode, SkillFact, Study};

/// Node labels written by the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeLabel {
    Person,
    Company,
    CompanyLocation,
    School,
    Language,
    Skill,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 6] = [
        NodeLabel::Person,
        NodeLabel::Company,
        NodeLabel::CompanyLocation,
        NodeLabel::School,
        NodeLabel::Language,
        NodeLabel::Skill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Person => "Person",
            NodeLabel::Company => "Company",
            NodeLabel::CompanyLocation => "CompanyLocation",
            NodeLabel::School => "School",
            NodeLabel::Language => "Language",
            NodeLabel::Skill => "Skill",
        }
    }
}

/// Relationship types written by the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelType {
    WorksFor,
    WorksAt,
    HasBranch,
    StudyAt,
    Speaks,
    HasSkill,
}

impl RelType {
    pub const ALL: [RelType; 6] = [
        RelType::WorksFor,
        RelType::WorksAt,
        RelType::HasBranch,
        RelType::StudyAt,
        RelType::Speaks,
        RelType::HasSkill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::WorksFor => "WORKS_FOR",
            RelType::WorksAt => "WORKS_AT",
            RelType::HasBranch => "HAS_BRANCH",
            RelType::StudyAt => "STUDY_AT",
            RelType::Speaks => "SPEAKS",
            RelType::HasSkill => "HAS_SKILL",
        }
    }
}

/// Write side of the property graph.
///
/// # Operations
///
/// | Method | Writes |
/// |--------|--------|
/// | [`merge_person`](GraphStore::merge_person) | `Person` |
/// | [`merge_employment`](GraphStore::merge_employment) | `Company`, `CompanyLocation`, `WORKS_FOR`, `WORKS_AT`, `HAS_BRANCH` |
/// | [`merge_language`](GraphStore::merge_language) | `Language`, `SPEAKS` |
/// | [`merge_study`](GraphStore::merge_study) | `School`, `STUDY_AT` |
/// | [`merge_skill`](GraphStore::merge_skill) | `Skill`, `HAS_SKILL` |
///
/// Every relationship write first matches the person by id. When it is
/// absent the write must fail with
/// [`GraphError::PersonNotFound`](crate::error::GraphError::PersonNotFound)
/// rather than create an orphan.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the person if absent. Existing properties are left untouched.
    async fn merge_person(&self, person: &PersonNode) -> Result<()>;

    /// Merge the company, its location, and the three employment edges.
    async fn merge_employment(&self, person_id: &str, employment: &Employment) -> Result<()>;

    /// Merge a spoken language.
    async fn merge_language(&self, person_id: &str, language: &LanguageFact) -> Result<()>;

    /// Merge a school and the `STUDY_AT` edge.
    async fn merge_study(&self, person_id: &str, study: &Study) -> Result<()>;

    /// Merge a skill.
    async fn merge_skill(&self, person_id: &str, skill: &SkillFact) -> Result<()>;
}
