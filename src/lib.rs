//! # people-graph
//!
//! Batch import of scraped person profiles into a property graph.
//!
//! Each input line is one JSON profile. The import derives content-addressed
//! ids for people, employers, locations, schools, languages, and skills, and
//! merges them into Memgraph or Neo4j over Bolt so that re-running the same
//! file never duplicates a node or relationship.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ JSONL file  │──▶│ Normalize        │──▶│ Graph store  │
//! │ (2 passes)  │   │ ids + skills     │   │ Bolt / memory│
//! └─────────────┘   └──────────────────┘   └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`graph`] | Bolt-backed graph store |
//! | [`ingest`] | Record reader and driver loop |
//! | [`progress`] | Progress reporting on stderr |
//!
//! Record schema, identity keys, skill extraction, and the store trait live
//! in the `people_graph_core` crate.

pub mod config;
pub mod graph;
pub mod ingest;
pub mod progress;
