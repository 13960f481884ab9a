//! In-memory [`GraphStore`] implementation for tests and dry runs.
//!
//! Uses `HashMap`s behind `std::sync::RwLock`. Nodes are keyed by
//! `(label, id)`; relationships by `(type, from, to, id)` where `id` is
//! `None` for edges merged on their endpoints alone (`SPEAKS`,
//! `HAS_SKILL`). This mirrors what a Cypher `MERGE` matches on.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::GraphError;
use crate::identity::{Employment, LanguageFact, PersonNode, SkillFact, Study, Tenure};

use super::{GraphStore, NodeLabel, RelType};

/// Property map of a node or relationship.
pub type Properties = BTreeMap<String, Value>;

type NodeKey = (NodeLabel, String);
type RelKey = (RelType, String, String, Option<String>);

/// A relationship as stored, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRelationship {
    pub rel_type: RelType,
    pub from: String,
    pub to: String,
    pub properties: Properties,
}

#[derive(Default)]
struct GraphState {
    nodes: HashMap<NodeKey, Properties>,
    relationships: HashMap<RelKey, Properties>,
}

impl GraphState {
    fn has_person(&self, id: &str) -> bool {
        self.nodes
            .contains_key(&(NodeLabel::Person, id.to_string()))
    }

    /// `MERGE (n:Label {id}) ON CREATE SET ...`
    fn merge_node(&mut self, label: NodeLabel, id: &str, on_create: Properties) {
        self.nodes
            .entry((label, id.to_string()))
            .or_insert_with(|| {
                let mut props = on_create;
                props.insert("id".to_string(), Value::from(id));
                props
            });
    }

    /// `MERGE (a)-[r:TYPE {id}]->(b)`; returns the property map for `SET`.
    fn merge_rel(
        &mut self,
        rel_type: RelType,
        from: &str,
        to: &str,
        id: Option<&str>,
    ) -> &mut Properties {
        let key = (
            rel_type,
            from.to_string(),
            to.to_string(),
            id.map(str::to_string),
        );
        self.relationships.entry(key).or_insert_with(|| {
            let mut props = Properties::new();
            if let Some(id) = id {
                props.insert("id".to_string(), Value::from(id));
            }
            props
        })
    }
}

/// In-memory property graph.
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
        }
    }

    pub fn node_count(&self, label: NodeLabel) -> usize {
        let state = self.state.read().unwrap();
        state.nodes.keys().filter(|(l, _)| *l == label).count()
    }

    pub fn relationship_count(&self, rel_type: RelType) -> usize {
        let state = self.state.read().unwrap();
        state
            .relationships
            .keys()
            .filter(|(t, _, _, _)| *t == rel_type)
            .count()
    }

    pub fn total_nodes(&self) -> usize {
        self.state.read().unwrap().nodes.len()
    }

    pub fn total_relationships(&self) -> usize {
        self.state.read().unwrap().relationships.len()
    }

    /// Properties of a node, if it exists.
    pub fn node(&self, label: NodeLabel, id: &str) -> Option<Properties> {
        let state = self.state.read().unwrap();
        state.nodes.get(&(label, id.to_string())).cloned()
    }

    /// All relationships of one type, sorted by endpoints and id.
    pub fn relationships(&self, rel_type: RelType) -> Vec<StoredRelationship> {
        let state = self.state.read().unwrap();
        let mut rels: Vec<StoredRelationship> = state
            .relationships
            .iter()
            .filter(|((t, _, _, _), _)| *t == rel_type)
            .map(|((t, from, to, _), props)| StoredRelationship {
                rel_type: *t,
                from: from.clone(),
                to: to.clone(),
                properties: props.clone(),
            })
            .collect();
        rels.sort_by(|a, b| {
            let key = |r: &StoredRelationship| {
                (
                    r.from.clone(),
                    r.to.clone(),
                    r.properties.get("id").and_then(Value::as_str).map(str::to_string),
                )
            };
            key(a).cmp(&key(b))
        });
        rels
    }
}

impl Default for InMemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn props<const N: usize>(entries: [(&str, Option<&str>); N]) -> Properties {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.map(Value::from).unwrap_or(Value::Null)))
        .collect()
}

/// `SET r.key = $value`; a null value removes the property.
fn set_optional(target: &mut Properties, key: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            target.insert(key.to_string(), Value::from(v));
        }
        None => {
            target.remove(key);
        }
    }
}

/// Dates are only ever set, never cleared.
fn set_tenure(target: &mut Properties, tenure: &Tenure) {
    if let Some(end) = tenure.end {
        target.insert("end".to_string(), Value::from(end.to_string()));
    }
    if let Some(start) = tenure.start {
        target.insert("start".to_string(), Value::from(start.to_string()));
    }
}

fn person_not_found(person_id: &str) -> anyhow::Error {
    GraphError::PersonNotFound(person_id.to_string()).into()
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn merge_person(&self, person: &PersonNode) -> Result<()> {
        let mut on_create = props([
            ("first_name", person.first_name.as_deref()),
            ("last_name", person.last_name.as_deref()),
            ("full_name", person.full_name.as_deref()),
            ("profile_pic_url", person.profile_pic_url.as_deref()),
            ("occupation", person.occupation.as_deref()),
            ("headline", person.headline.as_deref()),
            ("url", Some(person.url.as_str())),
        ]);
        on_create.insert(
            "connections".to_string(),
            person.connections.map(Value::from).unwrap_or(Value::Null),
        );
        on_create.retain(|_, v| !v.is_null());

        let mut state = self.state.write().unwrap();
        state.merge_node(NodeLabel::Person, &person.id, on_create);
        Ok(())
    }

    async fn merge_employment(&self, person_id: &str, employment: &Employment) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if !state.has_person(person_id) {
            return Err(person_not_found(person_id));
        }

        let company = &employment.company;
        let mut company_props = props([
            ("name", Some(company.name.as_str())),
            ("url", company.url.as_deref()),
            ("logo", company.logo.as_deref()),
        ]);
        company_props.retain(|_, v| !v.is_null());
        state.merge_node(NodeLabel::Company, &company.id, company_props);

        let location = &employment.location;
        state.merge_node(
            NodeLabel::CompanyLocation,
            &location.id,
            props([("name", Some(location.name.as_str()))]),
        );

        let works_for = &employment.works_for;
        let rel = state.merge_rel(
            RelType::WorksFor,
            person_id,
            &company.id,
            Some(&works_for.id),
        );
        set_optional(rel, "title", works_for.title.as_deref());
        set_optional(rel, "description", works_for.description.as_deref());
        set_tenure(rel, &works_for.tenure);

        let works_at = &employment.works_at;
        let rel = state.merge_rel(
            RelType::WorksAt,
            person_id,
            &location.id,
            Some(&works_at.id),
        );
        set_tenure(rel, &works_at.tenure);

        state.merge_rel(
            RelType::HasBranch,
            &company.id,
            &location.id,
            Some(&location.id),
        );
        Ok(())
    }

    async fn merge_language(&self, person_id: &str, language: &LanguageFact) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if !state.has_person(person_id) {
            return Err(person_not_found(person_id));
        }
        state.merge_node(
            NodeLabel::Language,
            &language.id,
            props([("name", Some(language.name.as_str()))]),
        );
        state.merge_rel(RelType::Speaks, person_id, &language.id, None);
        Ok(())
    }

    async fn merge_study(&self, person_id: &str, study: &Study) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if !state.has_person(person_id) {
            return Err(person_not_found(person_id));
        }

        let school = &study.school;
        let mut school_props = props([
            ("name", Some(school.name.as_str())),
            ("url", school.url.as_deref()),
            ("logo", school.logo.as_deref()),
        ]);
        school_props.retain(|_, v| !v.is_null());
        state.merge_node(NodeLabel::School, &school.id, school_props);

        let study_at = &study.study_at;
        let rel = state.merge_rel(
            RelType::StudyAt,
            person_id,
            &school.id,
            Some(&study_at.id),
        );
        set_optional(rel, "degree", study_at.degree.as_deref());
        set_optional(rel, "field", study_at.field.as_deref());
        set_optional(rel, "description", study_at.description.as_deref());
        set_tenure(rel, &study_at.tenure);
        Ok(())
    }

    async fn merge_skill(&self, person_id: &str, skill: &SkillFact) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if !state.has_person(person_id) {
            return Err(person_not_found(person_id));
        }
        state.merge_node(
            NodeLabel::Skill,
            &skill.id,
            props([("name", Some(skill.name.as_str()))]),
        );
        state.merge_rel(RelType::HasSkill, person_id, &skill.id, None);
        Ok(())
    }
}
