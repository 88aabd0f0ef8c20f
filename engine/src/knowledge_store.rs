//! Concept knowledge base
//!
//! SQLite store of concepts, their serialized specifications, the tag graph
//! linking concepts to single-token tags, and append-only ethical reviews.

use crate::config::IdeationConfig;
use crate::errors::{IdeationError, Result};
use crate::review::ApprovalStatus;
use crate::specification::Specification;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;
use std::path::Path;

/// Embedded schema SQL from KNOWLEDGE_BASE_SCHEMA.sql
const SCHEMA_SQL: &str = include_str!("../KNOWLEDGE_BASE_SCHEMA.sql");

/// A search hit: concept name and derived purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptSummary {
    pub id: i64,
    pub name: String,
    pub purpose: String,
}

/// Two concepts sharing more than one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synergy {
    pub first_id: i64,
    pub first: String,
    pub second_id: i64,
    pub second: String,
    pub shared_tags: u32,
}

/// Number of concepts linked to a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub concepts: u32,
}

/// A row from the ethical_reviews table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReview {
    pub id: i64,
    pub concept_id: i64,
    pub comments: Vec<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

/// Tag derived from a key feature: its last whitespace-delimited token
pub fn tag_for_feature(feature: &str) -> Option<&str> {
    feature.split_whitespace().last()
}

/// Knowledge base wrapper
pub struct KnowledgeStore {
    conn: Connection,
}

impl KnowledgeStore {
    /// Connect to the knowledge base and initialize schema
    ///
    /// Creates the database file if it doesn't exist.
    pub fn connect_and_init(cfg: &IdeationConfig) -> Result<Self> {
        let path = cfg.resolved_db_path();
        Self::connect_and_init_at_path(&path)
    }

    /// Connect to a specific database path
    pub fn connect_and_init_at_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                IdeationError::storage_with_source(
                    format!("failed to create db directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            IdeationError::storage_with_source(
                format!("failed to open db at {}", path.display()),
                e,
            )
        })?;

        Self::apply_schema(&conn)?;

        tracing::debug!(path = %path.display(), "Knowledge base initialized");

        Ok(Self { conn })
    }

    /// Connect to an in-memory database
    pub fn connect_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| IdeationError::storage_with_source("failed to open in-memory db", e))?;

        Self::apply_schema(&conn)?;

        Ok(Self { conn })
    }

    fn apply_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| IdeationError::storage_with_source("failed to apply schema", e))?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Concepts, specifications and the tag graph
    // ─────────────────────────────────────────────────────────────────────────────

    /// Persist a concept, its specification and its feature tags atomically
    ///
    /// Returns the new concept id. Any failure rolls back every write.
    pub fn add_concept(&mut self, concept: &str, spec: &Specification) -> Result<i64> {
        let spec_blob = serde_json::to_string(spec).map_err(|e| {
            IdeationError::storage_with_source("failed to serialize specification", e)
        })?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| IdeationError::storage_with_source("failed to begin transaction", e))?;

        tx.execute(
            "INSERT INTO concepts (name, description) VALUES (?1, ?2)",
            params![concept, spec.purpose],
        )
        .map_err(|e| IdeationError::storage_with_source("failed to insert concept", e))?;
        let concept_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO specifications (concept_id, spec_blob) VALUES (?1, ?2)",
            params![concept_id, spec_blob],
        )
        .map_err(|e| IdeationError::storage_with_source("failed to insert specification", e))?;

        for feature in &spec.key_features {
            let tag = tag_for_feature(feature).ok_or_else(|| {
                IdeationError::storage(format!("cannot derive a tag from feature {feature:?}"))
            })?;

            tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", params![tag])
                .map_err(|e| IdeationError::storage_with_source("failed to insert tag", e))?;

            let tag_id: i64 = tx
                .query_row("SELECT id FROM tags WHERE name = ?1", params![tag], |row| {
                    row.get(0)
                })
                .map_err(|e| IdeationError::storage_with_source("failed to look up tag", e))?;

            tx.execute(
                "INSERT OR IGNORE INTO concept_tags (concept_id, tag_id) VALUES (?1, ?2)",
                params![concept_id, tag_id],
            )
            .map_err(|e| IdeationError::storage_with_source("failed to link tag", e))?;
        }

        tx.commit()
            .map_err(|e| IdeationError::storage_with_source("failed to commit concept", e))?;

        tracing::debug!(
            concept_id,
            tags = spec.key_features.len(),
            "Stored concept"
        );
        Ok(concept_id)
    }

    /// Concepts whose name, purpose or any tag contains `query`
    ///
    /// Case-sensitive; `%` and `_` in `query` act as LIKE wildcards.
    pub fn search(&self, query: &str) -> Result<Vec<ConceptSummary>> {
        let pattern = format!("%{query}%");
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT DISTINCT c.id, c.name, c.description
                FROM concepts c
                LEFT JOIN concept_tags ct ON ct.concept_id = c.id
                LEFT JOIN tags t ON t.id = ct.tag_id
                WHERE c.name LIKE ?1 OR c.description LIKE ?1 OR t.name LIKE ?1
                ORDER BY c.id
                "#,
            )
            .map_err(|e| IdeationError::storage_with_source("failed to prepare search", e))?;

        let rows = stmt
            .query_map(params![pattern], |row| {
                Ok(ConceptSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    purpose: row.get(2)?,
                })
            })
            .map_err(|e| IdeationError::storage_with_source("failed to search concepts", e))?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(row.map_err(|e| {
                IdeationError::storage_with_source("failed to read concept row", e)
            })?);
        }
        Ok(hits)
    }

    /// Concept pairs sharing more than one distinct tag, strongest first
    pub fn synergies(&self, limit: usize) -> Result<Vec<Synergy>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT c1.id, c1.name, c2.id, c2.name, COUNT(DISTINCT ct1.tag_id) AS shared
                FROM concept_tags ct1
                JOIN concept_tags ct2
                  ON ct2.tag_id = ct1.tag_id AND ct1.concept_id < ct2.concept_id
                JOIN concepts c1 ON c1.id = ct1.concept_id
                JOIN concepts c2 ON c2.id = ct2.concept_id
                GROUP BY ct1.concept_id, ct2.concept_id
                HAVING shared > 1
                ORDER BY shared DESC, c1.id, c2.id
                LIMIT ?1
                "#,
            )
            .map_err(|e| IdeationError::storage_with_source("failed to prepare synergy query", e))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(Synergy {
                    first_id: row.get(0)?,
                    first: row.get(1)?,
                    second_id: row.get(2)?,
                    second: row.get(3)?,
                    shared_tags: row.get(4)?,
                })
            })
            .map_err(|e| IdeationError::storage_with_source("failed to query synergies", e))?;

        let mut synergies = Vec::new();
        for row in rows {
            synergies.push(row.map_err(|e| {
                IdeationError::storage_with_source("failed to read synergy row", e)
            })?);
        }
        Ok(synergies)
    }

    /// Linked-concept count per tag, most used first
    pub fn tag_distribution(&self) -> Result<Vec<TagCount>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT t.name, COUNT(DISTINCT ct.concept_id) AS uses
                FROM tags t
                JOIN concept_tags ct ON ct.tag_id = t.id
                GROUP BY t.id
                ORDER BY uses DESC, t.name
                "#,
            )
            .map_err(|e| IdeationError::storage_with_source("failed to prepare tag query", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(TagCount {
                    tag: row.get(0)?,
                    concepts: row.get(1)?,
                })
            })
            .map_err(|e| IdeationError::storage_with_source("failed to query tags", e))?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(
                row.map_err(|e| IdeationError::storage_with_source("failed to read tag row", e))?,
            );
        }
        Ok(counts)
    }

    /// Most recently stored concept with exactly this name
    pub fn find_concept_id(&self, name: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM concepts WHERE name = ?1 ORDER BY id DESC LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| IdeationError::storage_with_source("failed to look up concept", e))
    }

    pub fn get_specification(&self, concept_id: i64) -> Result<Option<Specification>> {
        let blob: Option<String> = self
            .conn
            .query_row(
                "SELECT spec_blob FROM specifications WHERE concept_id = ?1",
                params![concept_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| IdeationError::storage_with_source("failed to load specification", e))?;

        blob.map(|b| {
            serde_json::from_str(&b).map_err(|e| {
                IdeationError::storage_with_source(
                    format!("corrupt specification for concept {concept_id}"),
                    e,
                )
            })
        })
        .transpose()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Ethical reviews
    // ─────────────────────────────────────────────────────────────────────────────

    /// Append a review row; comments are stored as a JSON array
    pub fn record_review(
        &self,
        concept_id: i64,
        comments: &[String],
        status: ApprovalStatus,
    ) -> Result<i64> {
        let review_text = serde_json::to_string(comments)
            .map_err(|e| IdeationError::storage_with_source("failed to serialize review", e))?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                r#"
                INSERT INTO ethical_reviews (concept_id, review_text, approval_status, created_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![concept_id, review_text, status.as_str(), now],
            )
            .map_err(|e| IdeationError::storage_with_source("failed to insert review", e))?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn reviews_for(&self, concept_id: i64) -> Result<Vec<StoredReview>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT id, concept_id, review_text, approval_status, created_at
                FROM ethical_reviews
                WHERE concept_id = ?1
                ORDER BY id
                "#,
            )
            .map_err(|e| IdeationError::storage_with_source("failed to prepare review query", e))?;

        let rows = stmt
            .query_map(params![concept_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| IdeationError::storage_with_source("failed to query reviews", e))?;

        let mut reviews = Vec::new();
        for row in rows {
            let (id, concept_id, text, status, created) = row
                .map_err(|e| IdeationError::storage_with_source("failed to read review row", e))?;

            let comments: Vec<String> = serde_json::from_str(&text).map_err(|e| {
                IdeationError::storage_with_source(format!("corrupt review text in review {id}"), e)
            })?;
            let status = ApprovalStatus::parse(&status).ok_or_else(|| {
                IdeationError::storage(format!("unknown approval status {status:?} in review {id}"))
            })?;
            let created_at = DateTime::parse_from_rfc3339(&created)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    IdeationError::storage_with_source(format!("bad timestamp in review {id}"), e)
                })?;

            reviews.push(StoredReview {
                id,
                concept_id,
                comments,
                status,
                created_at,
            });
        }
        Ok(reviews)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Counts
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn concept_count(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM concepts")
    }

    pub fn tag_count(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM tags")
    }

    pub fn review_count(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM ethical_reviews")
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| IdeationError::storage_with_source("failed to count rows", e))?;
        Ok(n as u64)
    }
}
