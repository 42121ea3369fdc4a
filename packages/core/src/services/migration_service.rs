//! Schema drift detection and safe migration deployment.
//!
//! Two concerns live here:
//!
//! - **Drift**: compare an expected schema snapshot against the structure
//!   actually observed at check time, producing a severity-classified diff.
//! - **Safe deployment**: run a migration against multiple named targets,
//!   validating with a dry run before applying, tracking per-target
//!   success/failure with no cross-target rollback.

use crate::models::{ColumnSchema, SchemaSnapshot, TableSchema};
use crate::services::{NotificationCenter, ServiceError};
use crate::store::StoreError;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// How dangerous a single schema change is.
///
/// Ordered: `Critical > Warning > Info`, so the diff's overall severity is
/// the maximum over its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftSeverity {
    /// Additive change, existing reads and writes keep working
    Info,
    /// Behavior may change (e.g. a column became nullable)
    Warning,
    /// Reads or writes will break (removals, type changes)
    Critical,
}

/// One structural difference between expected and observed schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SchemaChange {
    TableAdded {
        table: String,
    },
    TableRemoved {
        table: String,
    },
    ColumnAdded {
        table: String,
        column: String,
    },
    ColumnRemoved {
        table: String,
        column: String,
    },
    ColumnTypeChanged {
        table: String,
        column: String,
        expected: String,
        observed: String,
    },
    NullabilityChanged {
        table: String,
        column: String,
        observed_nullable: bool,
    },
    DefaultChanged {
        table: String,
        column: String,
    },
}

impl SchemaChange {
    /// Severity classification of this change.
    pub fn severity(&self) -> DriftSeverity {
        match self {
            SchemaChange::TableAdded { .. }
            | SchemaChange::ColumnAdded { .. }
            | SchemaChange::DefaultChanged { .. } => DriftSeverity::Info,

            // A column that became nullable only loosens the contract; one
            // that stopped being nullable will reject writes.
            SchemaChange::NullabilityChanged {
                observed_nullable, ..
            } => {
                if *observed_nullable {
                    DriftSeverity::Warning
                } else {
                    DriftSeverity::Critical
                }
            }

            SchemaChange::TableRemoved { .. }
            | SchemaChange::ColumnRemoved { .. }
            | SchemaChange::ColumnTypeChanged { .. } => DriftSeverity::Critical,
        }
    }
}

/// A severity-classified schema diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    pub changes: Vec<SchemaChange>,
}

impl SchemaDiff {
    /// Whether expected and observed structure matched exactly.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Highest severity present, `None` when there is no drift.
    pub fn max_severity(&self) -> Option<DriftSeverity> {
        self.changes.iter().map(SchemaChange::severity).max()
    }

    /// Changes at one severity level.
    pub fn at_severity(&self, severity: DriftSeverity) -> Vec<&SchemaChange> {
        self.changes
            .iter()
            .filter(|c| c.severity() == severity)
            .collect()
    }
}

/// Compare an expected snapshot against the observed one.
///
/// Tables are matched by name, columns by name within each table. Entry
/// order follows the expected snapshot first (removals/changes), then the
/// observed one (additions).
pub fn diff_snapshots(expected: &SchemaSnapshot, observed: &SchemaSnapshot) -> SchemaDiff {
    let mut changes = Vec::new();

    for table in &expected.tables {
        match observed.table(&table.name) {
            None => changes.push(SchemaChange::TableRemoved {
                table: table.name.clone(),
            }),
            Some(observed_table) => diff_table(table, observed_table, &mut changes),
        }
    }

    for table in &observed.tables {
        if expected.table(&table.name).is_none() {
            changes.push(SchemaChange::TableAdded {
                table: table.name.clone(),
            });
        }
    }

    SchemaDiff { changes }
}

fn diff_table(expected: &TableSchema, observed: &TableSchema, changes: &mut Vec<SchemaChange>) {
    for column in &expected.columns {
        match observed.column(&column.name) {
            None => changes.push(SchemaChange::ColumnRemoved {
                table: expected.name.clone(),
                column: column.name.clone(),
            }),
            Some(observed_column) => {
                diff_column(&expected.name, column, observed_column, changes)
            }
        }
    }

    for column in &observed.columns {
        if expected.column(&column.name).is_none() {
            changes.push(SchemaChange::ColumnAdded {
                table: expected.name.clone(),
                column: column.name.clone(),
            });
        }
    }
}

fn diff_column(
    table: &str,
    expected: &ColumnSchema,
    observed: &ColumnSchema,
    changes: &mut Vec<SchemaChange>,
) {
    if expected.data_type != observed.data_type {
        changes.push(SchemaChange::ColumnTypeChanged {
            table: table.to_string(),
            column: expected.name.clone(),
            expected: expected.data_type.clone(),
            observed: observed.data_type.clone(),
        });
    }

    if expected.nullable != observed.nullable {
        changes.push(SchemaChange::NullabilityChanged {
            table: table.to_string(),
            column: expected.name.clone(),
            observed_nullable: observed.nullable,
        });
    }

    if expected.default != observed.default {
        changes.push(SchemaChange::DefaultChanged {
            table: table.to_string(),
            column: expected.name.clone(),
        });
    }
}

/// A named environment a migration can be deployed to.
#[async_trait]
pub trait MigrationTarget: Send + Sync {
    /// Target name as selected in deploy requests.
    fn name(&self) -> &str;

    /// Execute a named migration against this target. With `dry_run` the
    /// statements are validated in a non-committing context and nothing
    /// persists.
    async fn execute(&self, migration_name: &str, sql: &str, dry_run: bool)
        -> anyhow::Result<()>;
}

/// A migration deployment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    /// Names of the targets to deploy to
    pub target_names: Vec<String>,

    /// Human-readable migration name, shown in notifications and logs
    pub migration_name: String,

    /// The SQL to run
    pub sql_content: String,

    /// Validate only; nothing is applied anywhere
    pub dry_run: bool,
}

/// Per-target deployment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetStatus {
    /// SQL applied for real
    Applied,
    /// Dry run passed, nothing persisted
    DryRunOk,
    /// Dry run or apply failed; `error` carries the message
    Failed,
}

/// Result of one target of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResult {
    pub target: String,
    pub status: TargetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counts of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dry_run: bool,
}

/// Full deployment report: per-target results plus summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub migration_name: String,
    pub results: Vec<TargetResult>,
    pub summary: DeploySummary,
}

/// Drift checking and safe migration deployment over named targets.
pub struct MigrationService {
    targets: Vec<Arc<dyn MigrationTarget>>,
    notifications: Arc<NotificationCenter>,
}

impl MigrationService {
    pub fn new(
        targets: Vec<Arc<dyn MigrationTarget>>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            targets,
            notifications,
        }
    }

    /// Names of the configured targets.
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name()).collect()
    }

    /// Compare snapshots and notify when drift is present.
    pub fn check_drift(&self, expected: &SchemaSnapshot, observed: &SchemaSnapshot) -> SchemaDiff {
        let diff = diff_snapshots(expected, observed);

        match diff.max_severity() {
            None => info!("schema matches expected snapshot"),
            Some(severity) => {
                warn!(
                    "schema drift detected: {} change(s), worst {severity:?}",
                    diff.changes.len()
                );
                let title = "Schema drift detected";
                let message = format!("{} structural change(s) found", diff.changes.len());
                match severity {
                    DriftSeverity::Critical => self.notifications.error(title, message),
                    DriftSeverity::Warning => self.notifications.warning(title, message),
                    DriftSeverity::Info => self.notifications.info(title, message),
                }
            }
        }

        diff
    }

    /// Deploy a migration to the named targets.
    ///
    /// Every selected target gets a dry run first, concurrently. With
    /// `request.dry_run` the report stops there. Otherwise the targets
    /// whose dry run passed are applied (again concurrently); targets whose
    /// dry run failed are reported as failed and skipped. Targets are
    /// independent: one failing does not roll back the others.
    pub async fn deploy(&self, request: DeployRequest) -> Result<DeployReport, ServiceError> {
        let targets = self.resolve_targets(&request.target_names)?;

        info!(
            migration = %request.migration_name,
            targets = targets.len(),
            dry_run = request.dry_run,
            "deploying migration"
        );

        // Phase 1: dry-run validation on every target.
        let dry_runs = join_all(targets.iter().map(|target| {
            let name = &request.migration_name;
            let sql = &request.sql_content;
            async move {
                (
                    target.name().to_string(),
                    target.execute(name, sql, true).await,
                )
            }
        }))
        .await;

        let mut results = Vec::with_capacity(targets.len());

        if request.dry_run {
            for (name, outcome) in dry_runs {
                results.push(match outcome {
                    Ok(()) => TargetResult {
                        target: name,
                        status: TargetStatus::DryRunOk,
                        error: None,
                    },
                    Err(e) => TargetResult {
                        target: name,
                        status: TargetStatus::Failed,
                        error: Some(e.to_string()),
                    },
                });
            }
            return Ok(self.finish(request.migration_name, results, true));
        }

        // Phase 2: apply on the targets that validated.
        let mut to_apply = Vec::new();
        for (target, (name, outcome)) in targets.iter().zip(dry_runs) {
            match outcome {
                Ok(()) => to_apply.push(Arc::clone(target)),
                Err(e) => results.push(TargetResult {
                    target: name,
                    status: TargetStatus::Failed,
                    error: Some(format!("dry run failed: {e}")),
                }),
            }
        }

        let applies = join_all(to_apply.iter().map(|target| {
            let name = &request.migration_name;
            let sql = &request.sql_content;
            async move {
                (
                    target.name().to_string(),
                    target.execute(name, sql, false).await,
                )
            }
        }))
        .await;

        for (name, outcome) in applies {
            results.push(match outcome {
                Ok(()) => TargetResult {
                    target: name,
                    status: TargetStatus::Applied,
                    error: None,
                },
                Err(e) => TargetResult {
                    target: name,
                    status: TargetStatus::Failed,
                    error: Some(e.to_string()),
                },
            });
        }

        Ok(self.finish(request.migration_name, results, false))
    }

    fn resolve_targets(
        &self,
        names: &[String],
    ) -> Result<Vec<Arc<dyn MigrationTarget>>, ServiceError> {
        names
            .iter()
            .map(|name| {
                self.targets
                    .iter()
                    .find(|t| t.name() == name)
                    .cloned()
                    .ok_or_else(|| ServiceError::not_found("migration target", name))
            })
            .collect()
    }

    fn finish(
        &self,
        migration_name: String,
        results: Vec<TargetResult>,
        dry_run: bool,
    ) -> DeployReport {
        let failed = results
            .iter()
            .filter(|r| r.status == TargetStatus::Failed)
            .count();
        let summary = DeploySummary {
            total: results.len(),
            succeeded: results.len() - failed,
            failed,
            dry_run,
        };

        if failed == 0 {
            let what = if dry_run { "validated" } else { "applied" };
            self.notifications.success(
                format!("Migration {what}"),
                format!("{migration_name}: {} target(s)", summary.total),
            );
        } else {
            self.notifications.warning(
                "Migration incomplete",
                format!(
                    "{migration_name}: {failed} of {} target(s) failed",
                    summary.total
                ),
            );
        }

        DeployReport {
            migration_name,
            results,
            summary,
        }
    }
}

/// Remote target that proxies execution to the backend's deploy function
/// endpoint.
pub struct FunctionMigrationTarget {
    name: String,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl FunctionMigrationTarget {
    /// Create a target named `name` that posts to `endpoint`.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MigrationTarget for FunctionMigrationTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        migration_name: &str,
        sql: &str,
        dry_run: bool,
    ) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "sqlContent": sql,
                "migrationName": migration_name,
                "dryRun": dry_run,
            }))
            .send()
            .await
            .map_err(StoreError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::backend(status.as_u16(), message).into())
    }
}
