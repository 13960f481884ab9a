//! Import pipeline orchestration.
//!
//! Coordinates the full run: count lines → read line → parse → normalize →
//! write. Records are handled strictly one at a time, in file order. A bad
//! record is logged and skipped; a failed write abandons the rest of that
//! record (earlier writes stay applied) and the run moves on. Only
//! resource acquisition (input file, vocabulary, graph connection) is fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use people_graph_core::error::RecordError;
use people_graph_core::identity::{normalize, RecordFacts};
use people_graph_core::models::{ParsedLine, PersonRecord};
use people_graph_core::skills::SkillVocabulary;
use people_graph_core::store::memory::InMemoryGraph;
use people_graph_core::store::{GraphStore, NodeLabel, RelType};

use crate::config::Config;
use crate::graph::BoltGraph;
use crate::progress::{IngestProgressEvent, IngestProgressReporter};

/// Longest raw-line excerpt included in skip logs.
const LOG_SNIPPET_CHARS: usize = 200;

/// Per-run switches from the command line.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Import into an in-memory graph instead of the server.
    pub dry_run: bool,
    /// Stop after this many non-blank lines.
    pub limit: Option<usize>,
    /// Emit progress every N lines.
    pub progress_interval: u64,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Lines found by the counting pass.
    pub total_lines: u64,
    /// Lines visited by the import pass.
    pub lines_read: u64,
    /// Records whose writes all succeeded.
    pub records_written: u64,
    /// Blank lines, `null`, and `{}`.
    pub empty: u64,
    /// Lines skipped before any write: bad UTF-8, bad JSON, missing keys.
    pub malformed: u64,
    /// Records abandoned part-way because a write failed.
    pub failed: u64,
    /// `HAS_SKILL` edges attempted from inferred skills.
    pub skills_inferred: u64,
}

/// What happened to one non-blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Empty,
    Written { person_id: String, skills: usize },
}

/// Run the import configured in `config`.
///
/// The graph connection is opened once, before the first record, and
/// dropped once when the run ends, whether it succeeds or not.
pub async fn run_ingest(
    config: &Config,
    options: &IngestOptions,
    reporter: &dyn IngestProgressReporter,
) -> Result<IngestStats> {
    let vocabulary = load_vocabulary(config)?;
    let path = &config.input.path;

    File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    if options.dry_run {
        let graph = InMemoryGraph::new();
        let stats = ingest_file(&graph, path, &vocabulary, options, reporter).await?;
        print_summary(path, &stats, true);
        print_graph_counts(&graph);
        return Ok(stats);
    }

    let graph = BoltGraph::connect(config).await?;
    let result = ingest_file(&graph, path, &vocabulary, options, reporter).await;
    drop(graph);
    tracing::debug!("graph connection released");

    let stats = result?;
    print_summary(path, &stats, false);
    Ok(stats)
}

/// Configured vocabulary file, or the bundled list.
pub fn load_vocabulary(config: &Config) -> Result<SkillVocabulary> {
    let vocabulary = match &config.skills.vocabulary {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| {
                format!("Failed to read skill vocabulary: {}", path.display())
            })?;
            SkillVocabulary::from_text(&text)
        }
        None => SkillVocabulary::builtin(),
    };
    if vocabulary.is_empty() {
        tracing::warn!("skill vocabulary is empty; no skills will be inferred");
    }
    Ok(vocabulary)
}

/// Number of lines in the file, counting a final line without a newline.
pub fn count_lines(path: &Path) -> Result<u64> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let mut count = 0u64;
    for segment in BufReader::new(file).split(b'\n') {
        segment.with_context(|| format!("Failed to read {}", path.display()))?;
        count += 1;
    }
    Ok(count)
}

/// Two passes over `path`: count, then import every line into `store`.
pub async fn ingest_file<S: GraphStore + ?Sized>(
    store: &S,
    path: &Path,
    vocabulary: &SkillVocabulary,
    options: &IngestOptions,
    reporter: &dyn IngestProgressReporter,
) -> Result<IngestStats> {
    let total = count_lines(path)?;
    reporter.report(IngestProgressEvent::Counted {
        path: path.display().to_string(),
        total,
    });

    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let interval = options.progress_interval.max(1);
    let mut stats = IngestStats {
        total_lines: total,
        ..Default::default()
    };
    let mut attempted = 0usize;
    let mut last_reported = 0u64;

    for (idx, segment) in BufReader::new(file).split(b'\n').enumerate() {
        let line_no = idx as u64 + 1;
        let bytes = segment.with_context(|| format!("Failed to read {}", path.display()))?;
        if options.limit.is_some_and(|limit| attempted >= limit) {
            break;
        }
        stats.lines_read = line_no;

        match String::from_utf8(bytes) {
            Ok(line) if line.trim().is_empty() => stats.empty += 1,
            Ok(line) => {
                attempted += 1;
                match process_line(store, &line, vocabulary).await {
                    Ok(LineOutcome::Empty) => stats.empty += 1,
                    Ok(LineOutcome::Written { person_id, skills }) => {
                        tracing::debug!(line = line_no, person = %person_id, skills, "record written");
                        stats.records_written += 1;
                        stats.skills_inferred += skills as u64;
                    }
                    Err(err) if err.downcast_ref::<RecordError>().is_some() => {
                        tracing::warn!(
                            line = line_no,
                            error = %err,
                            raw = %snippet(&line),
                            "skipping malformed record"
                        );
                        stats.malformed += 1;
                    }
                    Err(err) => {
                        tracing::error!(
                            line = line_no,
                            error = %format!("{err:#}"),
                            raw = %snippet(&line),
                            "graph write failed; rest of record skipped"
                        );
                        stats.failed += 1;
                    }
                }
            }
            Err(err) => {
                attempted += 1;
                tracing::warn!(line = line_no, error = %err, "skipping line that is not UTF-8");
                stats.malformed += 1;
            }
        }

        if line_no % interval == 0 || line_no == total {
            reporter.report(IngestProgressEvent::Ingesting {
                n: line_no,
                total,
                written: stats.records_written,
            });
            last_reported = line_no;
        }
    }

    // A limit can stop the loop between reporting points.
    if stats.lines_read != last_reported {
        reporter.report(IngestProgressEvent::Ingesting {
            n: stats.lines_read,
            total,
            written: stats.records_written,
        });
    }

    Ok(stats)
}

/// Parse, normalize, and write one non-blank line.
///
/// [`RecordError`]s mean nothing was written. Any other error came from the
/// store after the person write was attempted.
pub async fn process_line<S: GraphStore + ?Sized>(
    store: &S,
    line: &str,
    vocabulary: &SkillVocabulary,
) -> Result<LineOutcome> {
    let record = match PersonRecord::parse_line(line)? {
        ParsedLine::Empty => return Ok(LineOutcome::Empty),
        ParsedLine::Record(record) => record,
    };
    let facts = normalize(&record, vocabulary)?;
    apply_facts(store, &facts).await?;
    Ok(LineOutcome::Written {
        person_id: facts.person.id.clone(),
        skills: facts.skills.len(),
    })
}

/// Write one record's facts: person first, then every relationship.
pub async fn apply_facts<S: GraphStore + ?Sized>(store: &S, facts: &RecordFacts) -> Result<()> {
    let person_id = facts.person.id.as_str();
    store
        .merge_person(&facts.person)
        .await
        .with_context(|| format!("person {person_id}"))?;

    for employment in &facts.employments {
        store
            .merge_employment(person_id, employment)
            .await
            .with_context(|| {
                format!(
                    "person {person_id}: employment at {}",
                    employment.company.name
                )
            })?;
    }
    for language in &facts.languages {
        store
            .merge_language(person_id, language)
            .await
            .with_context(|| format!("person {person_id}: language {}", language.name))?;
    }
    for study in &facts.studies {
        store
            .merge_study(person_id, study)
            .await
            .with_context(|| format!("person {person_id}: study at {}", study.school.name))?;
    }
    for skill in &facts.skills {
        store
            .merge_skill(person_id, skill)
            .await
            .with_context(|| format!("person {person_id}: skill {}", skill.name))?;
    }
    Ok(())
}

fn snippet(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() <= LOG_SNIPPET_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(LOG_SNIPPET_CHARS).collect();
        format!("{head}…")
    }
}

fn print_summary(path: &Path, stats: &IngestStats, dry_run: bool) {
    if dry_run {
        println!("ingest {} (dry-run)", path.display());
    } else {
        println!("ingest {}", path.display());
    }
    println!("  lines: {} / {}", stats.lines_read, stats.total_lines);
    println!("  records written: {}", stats.records_written);
    println!("  empty: {}", stats.empty);
    println!("  malformed: {}", stats.malformed);
    println!("  failed writes: {}", stats.failed);
    println!("  skills inferred: {}", stats.skills_inferred);
    println!("ok");
}

fn print_graph_counts(graph: &InMemoryGraph) {
    println!("graph");
    for label in NodeLabel::ALL {
        println!("  {:<16} {}", label.as_str(), graph.node_count(label));
    }
    for rel_type in RelType::ALL {
        println!(
            "  {:<16} {}",
            rel_type.as_str(),
            graph.relationship_count(rel_type)
        );
    }
}
