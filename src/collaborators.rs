//! External collaborators consulted by the validation pipeline.
//!
//! Each collaborator is a project-scoped request/response capability. The
//! pipeline owns the wait budget: every call goes through [`bounded_call`],
//! which turns an expired budget into [`CollaboratorError::Timeout`].

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::model::{Iri, ProjectId};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::time::{Duration, Instant};

/// Calls slower than this are logged at warn level.
const SLOW_CALL_THRESHOLD_MS: u64 = 1_000;

// =============================================================================
// Requests and responses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveEntityTypeRequest {
    pub project_id: ProjectId,
    pub entity_iri: Iri,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveEntityTypeResponse {
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIrisExistRequest {
    pub project_id: ProjectId,
    pub iris: BTreeSet<Iri>,
}

impl CheckIrisExistRequest {
    pub const CHANNEL: &'static str = "webprotege.entities.CheckNonExistentIris";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIrisExistResponse {
    #[serde(default)]
    pub non_existent_iris: BTreeSet<Iri>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateHierarchyRequest {
    pub project_id: ProjectId,
    /// Candidate values grouped by the hierarchy root they must descend from.
    pub hierarchy_roots_to_entities: BTreeMap<Iri, Vec<Iri>>,
}

impl ValidateHierarchyRequest {
    pub const CHANNEL: &'static str = "webprotege.icd.ValidateAxisBelongsToHierarchy";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateHierarchyResponse {
    /// Per root, the submitted values that are not descendants of it.
    #[serde(default)]
    pub invalid_entities_by_root: BTreeMap<Iri, Vec<Iri>>,
}

// =============================================================================
// Capabilities
// =============================================================================

/// Resolves the classification type(s) of an entity.
#[async_trait]
pub trait EntityTypeResolver: Send + Sync {
    async fn resolve_entity_type(
        &self,
        request: ResolveEntityTypeRequest,
    ) -> CollaboratorResult<ResolveEntityTypeResponse>;
}

/// Reports which IRIs are absent from a project.
#[async_trait]
pub trait IriExistenceChecker: Send + Sync {
    async fn check_iris_exist(
        &self,
        request: CheckIrisExistRequest,
    ) -> CollaboratorResult<CheckIrisExistResponse>;
}

/// Reports which candidate values fall outside their hierarchy root.
#[async_trait]
pub trait HierarchyValidator: Send + Sync {
    async fn validate_hierarchy_membership(
        &self,
        request: ValidateHierarchyRequest,
    ) -> CollaboratorResult<ValidateHierarchyResponse>;
}

/// Await `call` for at most `timeout`.
pub async fn bounded_call<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> CollaboratorResult<T>
where
    F: Future<Output = CollaboratorResult<T>>,
{
    let started = Instant::now();
    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout { operation, timeout }),
    };

    crate::log_slow_operation!(
        started.elapsed(),
        SLOW_CALL_THRESHOLD_MS,
        operation = operation,
        succeeded = outcome.is_ok(),
        "collaborator call finished"
    );

    if let Err(error) = &outcome {
        tracing::error!(operation = operation, error = %error, "collaborator call failed");
    }
    outcome
}

// =============================================================================
// In-memory collaborators
// =============================================================================

/// A call received by [`InMemoryCollaborators`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorCall {
    ResolveEntityType(ResolveEntityTypeRequest),
    CheckIrisExist(CheckIrisExistRequest),
    ValidateHierarchy(ValidateHierarchyRequest),
}

/// Project data for fixture-backed collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFixture {
    /// Entity IRI to its classification types.
    #[serde(default)]
    pub entity_types: HashMap<Iri, Vec<String>>,
    /// Every IRI that exists in the project.
    #[serde(default)]
    pub existing_iris: BTreeSet<Iri>,
    /// Hierarchy root to all of its descendants.
    #[serde(default)]
    pub hierarchy: HashMap<Iri, BTreeSet<Iri>>,
}

/// Serves all three collaborators from a [`ProjectFixture`].
///
/// Every received request is recorded and can be inspected with
/// [`InMemoryCollaborators::calls`].
#[derive(Debug, Default)]
pub struct InMemoryCollaborators {
    fixture: ProjectFixture,
    calls: Mutex<Vec<CollaboratorCall>>,
}

impl InMemoryCollaborators {
    pub fn new(fixture: ProjectFixture) -> Self {
        Self {
            fixture,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CollaboratorCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: CollaboratorCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl EntityTypeResolver for InMemoryCollaborators {
    async fn resolve_entity_type(
        &self,
        request: ResolveEntityTypeRequest,
    ) -> CollaboratorResult<ResolveEntityTypeResponse> {
        let types = self
            .fixture
            .entity_types
            .get(&request.entity_iri)
            .cloned()
            .unwrap_or_default();
        self.record(CollaboratorCall::ResolveEntityType(request));
        Ok(ResolveEntityTypeResponse { types })
    }
}

#[async_trait]
impl IriExistenceChecker for InMemoryCollaborators {
    async fn check_iris_exist(
        &self,
        request: CheckIrisExistRequest,
    ) -> CollaboratorResult<CheckIrisExistResponse> {
        let non_existent_iris = request
            .iris
            .iter()
            .filter(|iri| !self.fixture.existing_iris.contains(*iri))
            .cloned()
            .collect();
        self.record(CollaboratorCall::CheckIrisExist(request));
        Ok(CheckIrisExistResponse { non_existent_iris })
    }
}

#[async_trait]
impl HierarchyValidator for InMemoryCollaborators {
    async fn validate_hierarchy_membership(
        &self,
        request: ValidateHierarchyRequest,
    ) -> CollaboratorResult<ValidateHierarchyResponse> {
        let empty = BTreeSet::new();
        let mut invalid_entities_by_root = BTreeMap::new();
        for (root, candidates) in &request.hierarchy_roots_to_entities {
            let descendants = self.fixture.hierarchy.get(root).unwrap_or(&empty);
            let invalid: Vec<Iri> = candidates
                .iter()
                .filter(|candidate| !descendants.contains(*candidate))
                .cloned()
                .collect();
            if !invalid.is_empty() {
                invalid_entities_by_root.insert(root.clone(), invalid);
            }
        }
        self.record(CollaboratorCall::ValidateHierarchy(request));
        Ok(ValidateHierarchyResponse {
            invalid_entities_by_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fixture() -> ProjectFixture {
        ProjectFixture {
            entity_types: HashMap::from([(Iri::new("E1"), vec!["ICD".to_string()])]),
            existing_iris: BTreeSet::from([Iri::new("http://x/acute")]),
            hierarchy: HashMap::from([(
                Iri::new("http://x/CourseTop"),
                BTreeSet::from([Iri::new("http://x/acute")]),
            )]),
        }
    }

    #[tokio::test]
    async fn existence_reports_missing_iris_only() {
        let collaborators = InMemoryCollaborators::new(fixture());
        let response = collaborators
            .check_iris_exist(CheckIrisExistRequest {
                project_id: ProjectId::new("p"),
                iris: BTreeSet::from([Iri::new("http://x/acute"), Iri::new("http://x/nope")]),
            })
            .await
            .unwrap();

        assert_eq!(response.non_existent_iris, BTreeSet::from([Iri::new("http://x/nope")]));
        assert_eq!(collaborators.calls().len(), 1);
    }

    #[tokio::test]
    async fn hierarchy_reports_values_outside_root() {
        let collaborators = InMemoryCollaborators::new(fixture());
        let root = Iri::new("http://x/CourseTop");
        let response = collaborators
            .validate_hierarchy_membership(ValidateHierarchyRequest {
                project_id: ProjectId::new("p"),
                hierarchy_roots_to_entities: BTreeMap::from([(
                    root.clone(),
                    vec![Iri::new("http://x/acute"), Iri::new("http://x/left")],
                )]),
            })
            .await
            .unwrap();

        assert_eq!(
            response.invalid_entities_by_root.get(&root),
            Some(&vec![Iri::new("http://x/left")])
        );
    }

    #[tokio::test]
    async fn unknown_entity_has_no_types() {
        let collaborators = InMemoryCollaborators::new(fixture());
        let response = collaborators
            .resolve_entity_type(ResolveEntityTypeRequest {
                project_id: ProjectId::new("p"),
                entity_iri: Iri::new("E2"),
            })
            .await
            .unwrap();
        assert!(response.types.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_call_times_out() {
        let outcome: CollaboratorResult<()> = bounded_call("slow lookup", Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        assert_matches!(
            outcome,
            Err(CollaboratorError::Timeout { operation: "slow lookup", timeout }) if timeout == Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn bounded_call_passes_errors_through() {
        let outcome: CollaboratorResult<()> = bounded_call("lookup", Duration::from_secs(5), async {
            Err(CollaboratorError::transport("connection refused"))
        })
        .await;

        assert_eq!(outcome, Err(CollaboratorError::transport("connection refused")));
    }
}
