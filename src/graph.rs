//! Bolt-backed [`GraphStore`] for Memgraph and Neo4j.
//!
//! Each trait method sends one parameterized Cypher statement. Relationship
//! statements start with `MATCH (p:Person {id: $p_id})` and end with
//! `RETURN p.id`, so a missing person shows up as an empty result and is
//! reported as [`GraphError::PersonNotFound`] instead of a silent no-op.
//!
//! Dates are attached with `date({year, month, day})` only when the
//! [`Tenure`] side is fully known; the clause is omitted otherwise.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use neo4rs::{query, ConfigBuilder, Graph, Query};

use people_graph_core::error::GraphError;
use people_graph_core::identity::{
    Employment, LanguageFact, PersonNode, SkillFact, Study, Tenure,
};
use people_graph_core::store::GraphStore;

use crate::config::Config;

const PERSON_STATEMENT: &str = "
MERGE (p:Person {id: $id})
    ON CREATE SET p.first_name = $first_name, p.last_name = $last_name,
        p.full_name = $full_name, p.profile_pic_url = $profile_pic_url,
        p.occupation = $occupation, p.headline = $headline,
        p.connections = $connections, p.url = $url
RETURN p.id AS id";

const LANGUAGE_STATEMENT: &str = "
MATCH (p:Person {id: $p_id})
MERGE (l:Language {id: $l_id})
    ON CREATE SET l.name = $name
MERGE (p)-[:SPEAKS]->(l)
RETURN p.id AS id";

const SKILL_STATEMENT: &str = "
MATCH (p:Person {id: $p_id})
MERGE (s:Skill {id: $s_id})
    ON CREATE SET s.name = $name
MERGE (p)-[:HAS_SKILL]->(s)
RETURN p.id AS id";

/// Connection pool to the graph server, acquired once per run.
pub struct BoltGraph {
    graph: Graph,
}

impl BoltGraph {
    pub async fn connect(config: &Config) -> Result<Self> {
        let graph_cfg = &config.graph;
        let mut builder = ConfigBuilder::default()
            .uri(graph_cfg.uri.as_str())
            .user(graph_cfg.user.as_str())
            .password(graph_cfg.password.as_str())
            .max_connections(graph_cfg.max_connections);
        if let Some(db) = &graph_cfg.database {
            builder = builder.db(db.as_str());
        }
        let bolt_config = builder.build().context("Invalid graph connection settings")?;

        let graph = Graph::connect(bolt_config)
            .await
            .with_context(|| format!("Failed to connect to graph at {}", graph_cfg.uri))?;
        // The pool connects lazily; fail here rather than on the first record.
        graph
            .run(query("RETURN 1"))
            .await
            .with_context(|| format!("Failed to connect to graph at {}", graph_cfg.uri))?;

        tracing::info!(uri = %graph_cfg.uri, "connected to graph");
        Ok(Self { graph })
    }

    /// Run a statement that ends in `RETURN p.id`; no row means no person.
    async fn run_for_person(&self, q: Query, person_id: &str) -> Result<()> {
        let mut rows = self.graph.execute(q).await?;
        let mut matched = false;
        while rows.next().await?.is_some() {
            matched = true;
        }
        if matched {
            Ok(())
        } else {
            Err(GraphError::PersonNotFound(person_id.to_string()).into())
        }
    }
}

#[async_trait]
impl GraphStore for BoltGraph {
    async fn merge_person(&self, person: &PersonNode) -> Result<()> {
        let q = query(PERSON_STATEMENT)
            .param("id", person.id.as_str())
            .param("first_name", person.first_name.clone())
            .param("last_name", person.last_name.clone())
            .param("full_name", person.full_name.clone())
            .param("profile_pic_url", person.profile_pic_url.clone())
            .param("occupation", person.occupation.clone())
            .param("headline", person.headline.clone())
            .param("connections", person.connections)
            .param("url", person.url.as_str());
        self.run_for_person(q, &person.id).await
    }

    async fn merge_employment(&self, person_id: &str, employment: &Employment) -> Result<()> {
        let works_for = &employment.works_for;
        let q = query(&employment_statement(&works_for.tenure, &employment.works_at.tenure))
            .param("p_id", person_id)
            .param("c_id", employment.company.id.as_str())
            .param("company", employment.company.name.as_str())
            .param("url", employment.company.url.clone())
            .param("logo", employment.company.logo.clone())
            .param("l_id", employment.location.id.as_str())
            .param("location", employment.location.name.as_str())
            .param("e_id", works_for.id.as_str())
            .param("title", works_for.title.clone())
            .param("description", works_for.description.clone())
            .param("lp_id", employment.works_at.id.as_str());
        let q = bind_tenure(q, &works_for.tenure);
        self.run_for_person(q, person_id).await
    }

    async fn merge_language(&self, person_id: &str, language: &LanguageFact) -> Result<()> {
        let q = query(LANGUAGE_STATEMENT)
            .param("p_id", person_id)
            .param("l_id", language.id.as_str())
            .param("name", language.name.as_str());
        self.run_for_person(q, person_id).await
    }

    async fn merge_study(&self, person_id: &str, study: &Study) -> Result<()> {
        let study_at = &study.study_at;
        let q = query(&study_statement(&study_at.tenure))
            .param("p_id", person_id)
            .param("s_id", study.school.id.as_str())
            .param("school", study.school.name.as_str())
            .param("url", study.school.url.clone())
            .param("logo", study.school.logo.clone())
            .param("se_id", study_at.id.as_str())
            .param("degree_name", study_at.degree.clone())
            .param("field_of_study", study_at.field.clone())
            .param("description", study_at.description.clone());
        let q = bind_tenure(q, &study_at.tenure);
        self.run_for_person(q, person_id).await
    }

    async fn merge_skill(&self, person_id: &str, skill: &SkillFact) -> Result<()> {
        let q = query(SKILL_STATEMENT)
            .param("p_id", person_id)
            .param("s_id", skill.id.as_str())
            .param("name", skill.name.as_str());
        self.run_for_person(q, person_id).await
    }
}

/// `r.end = date(...)`, `r.start = date(...)` for the known sides.
fn tenure_assignments(var: &str, tenure: &Tenure) -> Vec<String> {
    let mut out = Vec::new();
    if tenure.end.is_some() {
        out.push(format!(
            "{var}.end = date({{year: $ends_year, month: $ends_month, day: $ends_day}})"
        ));
    }
    if tenure.start.is_some() {
        out.push(format!(
            "{var}.start = date({{year: $starts_year, month: $starts_month, day: $starts_day}})"
        ));
    }
    out
}

fn bind_date(q: Query, prefix: &str, date: Option<NaiveDate>) -> Query {
    match date {
        Some(d) => q
            .param(&format!("{prefix}_year"), i64::from(d.year()))
            .param(&format!("{prefix}_month"), i64::from(d.month()))
            .param(&format!("{prefix}_day"), i64::from(d.day())),
        None => q,
    }
}

fn bind_tenure(q: Query, tenure: &Tenure) -> Query {
    let q = bind_date(q, "ends", tenure.end);
    bind_date(q, "starts", tenure.start)
}

fn employment_statement(works_for: &Tenure, works_at: &Tenure) -> String {
    let mut works_for_set = vec![
        "r.title = $title".to_string(),
        "r.description = $description".to_string(),
    ];
    works_for_set.extend(tenure_assignments("r", works_for));

    let works_at_set = tenure_assignments("a", works_at);
    let works_at_clause = if works_at_set.is_empty() {
        String::new()
    } else {
        format!("\nSET {}", works_at_set.join(", "))
    };

    format!(
        "
MATCH (p:Person {{id: $p_id}})
MERGE (c:Company {{id: $c_id}})
    ON CREATE SET c.name = $company, c.url = $url, c.logo = $logo
MERGE (l:CompanyLocation {{id: $l_id}})
    ON CREATE SET l.name = $location
MERGE (p)-[r:WORKS_FOR {{id: $e_id}}]->(c)
SET {}
MERGE (p)-[a:WORKS_AT {{id: $lp_id}}]->(l){}
MERGE (c)-[:HAS_BRANCH {{id: $l_id}}]->(l)
RETURN p.id AS id",
        works_for_set.join(", "),
        works_at_clause
    )
}

fn study_statement(tenure: &Tenure) -> String {
    let mut set = vec![
        "r.degree = $degree_name".to_string(),
        "r.field = $field_of_study".to_string(),
        "r.description = $description".to_string(),
    ];
    set.extend(tenure_assignments("r", tenure));

    format!(
        "
MATCH (p:Person {{id: $p_id}})
MERGE (s:School {{id: $s_id}})
    ON CREATE SET s.name = $school, s.url = $url, s.logo = $logo
MERGE (p)-[r:STUDY_AT {{id: $se_id}}]->(s)
SET {}
RETURN p.id AS id",
        set.join(", ")
    )
}
