//! Collects everything an audit export needs for one organization and framework.

use chrono::Utc;
use domain::services::ExportSnapshot;
use persistence::repositories::{
    EvidenceRepository, FrameworkRepository, PolicyRepository, TaskRepository,
};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Framework {0} not found")]
    FrameworkNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::FrameworkNotFound(_) => ApiError::NotFound("Framework not found".into()),
            AggregateError::Database(e) => e.into(),
        }
    }
}

/// Read side of the export pipeline.
#[derive(Clone)]
pub struct Aggregator {
    frameworks: FrameworkRepository,
    policies: PolicyRepository,
    evidence: EvidenceRepository,
    tasks: TaskRepository,
}

impl Aggregator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            frameworks: FrameworkRepository::new(pool.clone()),
            policies: PolicyRepository::new(pool.clone()),
            evidence: EvidenceRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool),
        }
    }

    /// Builds the snapshot. Reads are separate queries, so the result is a
    /// best-effort point-in-time view.
    pub async fn snapshot(
        &self,
        organization_id: Uuid,
        framework_id: Uuid,
    ) -> Result<ExportSnapshot, AggregateError> {
        let framework = self
            .frameworks
            .find_by_id(framework_id)
            .await?
            .ok_or(AggregateError::FrameworkNotFound(framework_id))?;

        let controls = self.frameworks.controls_for_framework(framework_id).await?;
        let policies = self
            .policies
            .list_for_framework(organization_id, framework_id)
            .await?;
        let evidence = self.evidence.list_for_export(organization_id).await?;
        let tasks = self.tasks.list_for_export(organization_id).await?;

        tracing::debug!(
            organization_id = %organization_id,
            framework_id = %framework_id,
            controls = controls.len(),
            policies = policies.len(),
            evidence = evidence.len(),
            tasks = tasks.len(),
            "Export snapshot collected"
        );

        Ok(ExportSnapshot::new(
            organization_id,
            framework,
            controls,
            policies,
            evidence,
            tasks,
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_missing_framework_is_not_found() {
        let err: ApiError = AggregateError::FrameworkNotFound(Uuid::new_v4()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
