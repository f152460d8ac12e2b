//! Request dispatcher: rate limit, session, permission, parse, execute.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use common::{ApiResponse, AppError, AppResult};
use domain::{OrgUnit, PermissionMatrix};
use org_service_lib::model::OrgSummary;
use org_service_lib::service::Units;
use org_service_lib::OrgServices;

use super::request::{AssignmentAction, Request, UnitAction};
use crate::middleware::{Cache, RateLimiter, SessionStore, SessionUser, ANONYMOUS, CACHE_KEY_SUMMARY};

/// Cached organization summary.
pub struct SummaryCache {
    pub cache: Arc<Cache>,
    pub ttl_seconds: u64,
}

/// Routes `resource.verb` requests to the organization services.
pub struct Dispatcher {
    services: OrgServices,
    sessions: Arc<dyn SessionStore>,
    limiter: Arc<dyn RateLimiter>,
    permissions: PermissionMatrix,
    summary_cache: Option<SummaryCache>,
}

impl Dispatcher {
    pub fn new(
        services: OrgServices,
        sessions: Arc<dyn SessionStore>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            services,
            sessions,
            limiter,
            permissions: PermissionMatrix::default(),
            summary_cache: None,
        }
    }

    pub fn with_permissions(mut self, permissions: PermissionMatrix) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_summary_cache(mut self, cache: Arc<Cache>, ttl_seconds: u64) -> Self {
        self.summary_cache = Some(SummaryCache { cache, ttl_seconds });
        self
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Run one request; every outcome becomes an envelope.
    pub async fn dispatch(
        &self,
        token: Option<&str>,
        resource: &str,
        verb: &str,
        data: Value,
    ) -> ApiResponse<Value> {
        match self.handle(token, resource, verb, data).await {
            Ok(response) => response,
            Err(err) => ApiResponse::failure(&err),
        }
    }

    /// Like [`dispatch`](Self::dispatch) for a combined `resource.verb` action.
    pub async fn dispatch_action(
        &self,
        token: Option<&str>,
        action: &str,
        data: Value,
    ) -> ApiResponse<Value> {
        match Request::split_action(action) {
            Some((resource, verb)) => self.dispatch(token, resource, verb, data).await,
            None => ApiResponse::failure(&AppError::UnknownAction(action.to_string())),
        }
    }

    async fn handle(
        &self,
        token: Option<&str>,
        resource: &str,
        verb: &str,
        data: Value,
    ) -> AppResult<ApiResponse<Value>> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());

        let key = token.unwrap_or(ANONYMOUS);
        match self.limiter.allow(key).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(resource = %resource, verb = %verb, "Rate limit exceeded");
                return Err(AppError::TooManyRequests);
            }
            Err(e) => {
                // Fail closed
                warn!(error = %e, "Rate limiter unavailable");
                return Err(AppError::TooManyRequests);
            }
        }

        let user = match token {
            Some(token) => self.sessions.resolve(token).await?,
            None => None,
        }
        .ok_or(AppError::Unauthorized)?;

        let permission = Request::route(resource, verb)?;
        if !self.permissions.allows(user.role, permission) {
            warn!(user_id = %user.user_id, role = %user.role, %permission, "Permission denied");
            return Err(AppError::Forbidden(permission.to_string()));
        }

        // Payload is only read once the caller may run the action
        let request = Request::parse(resource, verb, data)?;

        debug!(user_id = %user.user_id, resource = %resource, verb = %verb, "Dispatching");
        self.execute(request, &user).await
    }

    async fn execute(&self, request: Request, user: &SessionUser) -> AppResult<ApiResponse<Value>> {
        let s = &self.services;
        match request {
            Request::Directorates(action) => run_unit(&s.directorates, action, user).await,
            Request::WorkUnits(action) => run_unit(&s.work_units, action, user).await,
            Request::Affairs(action) => run_unit(&s.affairs, action, user).await,
            Request::Positions(action) => run_unit(&s.positions, action, user).await,
            Request::Assignments(action) => self.run_assignment(action, user).await,
            Request::AuditLogs(query) => data(s.organization.audit_log(query).await?),
            Request::Summary => data(self.summary().await?),
            Request::Orphans => data(s.organization.orphans().await?),
        }
    }

    async fn run_assignment(
        &self,
        action: AssignmentAction,
        user: &SessionUser,
    ) -> AppResult<ApiResponse<Value>> {
        let assignments = &self.services.assignments;
        let actor = user.user_id.as_str();
        match action {
            AssignmentAction::List(filter) => data(assignments.list(filter).await?),
            AssignmentAction::Get { id } => data(assignments.get(&id).await?),
            AssignmentAction::Create(input) => {
                let created = assignments.create(input, actor).await?;
                with_message(created, "Assignment created")
            }
            AssignmentAction::Update { id, patch } => {
                let updated = assignments.update(&id, patch, actor).await?;
                with_message(updated, "Assignment updated")
            }
            AssignmentAction::End { id, end_date } => {
                let ended = assignments.end(&id, end_date, actor).await?;
                with_message(ended, "Assignment ended")
            }
            AssignmentAction::Delete { id } => {
                let deleted = assignments.delete(&id, actor).await?;
                with_message(deleted, "Assignment deleted")
            }
        }
    }

    /// Organization summary, served from cache while fresh.
    async fn summary(&self) -> AppResult<OrgSummary> {
        let Some(cached) = &self.summary_cache else {
            return self.services.organization.summary().await;
        };

        match cached.cache.get::<OrgSummary>(CACHE_KEY_SUMMARY).await {
            Ok(Some(summary)) => return Ok(summary),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Summary cache read failed"),
        }

        let summary = self.services.organization.summary().await?;
        if let Err(e) = cached
            .cache
            .set_with_ttl(CACHE_KEY_SUMMARY, &summary, cached.ttl_seconds)
            .await
        {
            warn!(error = %e, "Summary cache write failed");
        }
        Ok(summary)
    }
}

async fn run_unit<E, I>(
    service: &Units<E, I>,
    action: UnitAction<I>,
    user: &SessionUser,
) -> AppResult<ApiResponse<Value>>
where
    E: OrgUnit + Serialize + Send + Sync + 'static,
    I: DeserializeOwned + Send + 'static,
{
    let actor = user.user_id.as_str();
    let label = E::KIND.label();

    match action {
        UnitAction::List(filter) => data(service.list(filter).await?),
        UnitAction::Get { id } => data(service.get(&id).await?),
        UnitAction::Create(input) => {
            let created = service.create(input, actor).await?;
            let message = format!("{} {} created", label, created.code());
            with_message(created, message)
        }
        UnitAction::Update { id, patch } => {
            let updated = service.update(&id, patch, actor).await?;
            let message = format!("{} {} updated", label, updated.code());
            with_message(updated, message)
        }
        UnitAction::Delete { id } => {
            let deleted = service.delete(&id, actor).await?;
            let message = format!("{} {} deleted", label, deleted.code());
            with_message(deleted, message)
        }
        UnitAction::DeleteCascade { id } => {
            let removed = service.delete_cascade(&id, actor).await?;
            let message = format!("{} deleted with {} descendants", label, removed.total);
            with_message(removed, message)
        }
        UnitAction::ReassignDelete { id, new_parent_id } => {
            let report = service.reassign_delete(&id, &new_parent_id, actor).await?;
            let message = format!(
                "{} deleted after moving {} children",
                label, report.moved.total
            );
            with_message(report, message)
        }
        UnitAction::CheckChildren { id } => data(service.check_children(&id).await?),
        UnitAction::GetAlternatives { id } => data(service.get_alternatives(&id).await?),
        UnitAction::GenerateCode => data(service.generate_code().await?),
    }
}

fn data<T: Serialize>(value: T) -> AppResult<ApiResponse<Value>> {
    Ok(ApiResponse::success(serde_json::to_value(value)?))
}

fn with_message<T: Serialize>(value: T, message: impl Into<String>) -> AppResult<ApiResponse<Value>> {
    Ok(ApiResponse::with_message(serde_json::to_value(value)?, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{MockRateLimiter, MockSessionStore};
    use domain::Role;
    use org_service_lib::repository::MemoryStore;
    use serde_json::json;

    fn services() -> OrgServices {
        OrgServices::new(Arc::new(MemoryStore::new()))
    }

    fn viewer() -> SessionUser {
        SessionUser {
            user_id: "v-1".to_string(),
            name: "Viewer".to_string(),
            role: Role::Viewer,
        }
    }

    #[tokio::test]
    async fn test_limiter_failure_denies_request() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_allow()
            .returning(|_| Err(AppError::internal("redis down")));
        let mut sessions = MockSessionStore::new();
        sessions.expect_resolve().never();

        let dispatcher = Dispatcher::new(services(), Arc::new(sessions), Arc::new(limiter));
        let response = dispatcher
            .dispatch(Some("t"), "directorates", "list", Value::Null)
            .await;

        assert!(!response.success);
        assert_eq!(response.code.as_deref(), Some("TOO_MANY_REQUESTS"));
    }

    #[tokio::test]
    async fn test_missing_token_uses_anonymous_bucket() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_allow()
            .withf(|key| key == ANONYMOUS)
            .times(1)
            .returning(|_| Ok(true));

        let dispatcher = Dispatcher::new(
            services(),
            Arc::new(MockSessionStore::new()),
            Arc::new(limiter),
        );
        let response = dispatcher
            .dispatch(None, "directorates", "list", Value::Null)
            .await;

        assert_eq!(response.code.as_deref(), Some("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn test_session_is_checked_before_action_name() {
        let mut limiter = MockRateLimiter::new();
        limiter.expect_allow().returning(|_| Ok(true));
        let mut sessions = MockSessionStore::new();
        sessions.expect_resolve().returning(|_| Ok(None));

        let dispatcher = Dispatcher::new(services(), Arc::new(sessions), Arc::new(limiter));
        let response = dispatcher
            .dispatch(Some("stale"), "nonsense", "verb", Value::Null)
            .await;

        assert_eq!(response.code.as_deref(), Some("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn test_viewer_cannot_create() {
        let mut limiter = MockRateLimiter::new();
        limiter.expect_allow().returning(|_| Ok(true));
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_resolve()
            .withf(|token| token == "viewer-token")
            .returning(|_| Ok(Some(viewer())));

        let dispatcher = Dispatcher::new(services(), Arc::new(sessions), Arc::new(limiter));
        let response = dispatcher
            .dispatch(
                Some("viewer-token"),
                "directorates",
                "create",
                json!({"name": "Planning"}),
            )
            .await;

        assert!(!response.success);
        assert_eq!(response.code.as_deref(), Some("FORBIDDEN"));
        assert_eq!(
            response.message.as_deref(),
            Some("You do not have permission to create directorates")
        );
    }

    #[tokio::test]
    async fn test_permission_is_checked_before_payload() {
        let mut limiter = MockRateLimiter::new();
        limiter.expect_allow().returning(|_| Ok(true));
        let mut sessions = MockSessionStore::new();
        sessions.expect_resolve().returning(|_| Ok(Some(viewer())));

        let dispatcher = Dispatcher::new(services(), Arc::new(sessions), Arc::new(limiter));
        for (verb, payload) in [
            ("delete-cascade", json!({})),
            ("create", json!({"name": 12})),
        ] {
            let response = dispatcher
                .dispatch(Some("t"), "directorates", verb, payload)
                .await;
            assert_eq!(response.code.as_deref(), Some("FORBIDDEN"), "{verb}");
            assert!(response.errors.is_none());
        }
    }

    #[tokio::test]
    async fn test_custom_matrix_is_honoured() {
        let mut limiter = MockRateLimiter::new();
        limiter.expect_allow().returning(|_| Ok(true));
        let mut sessions = MockSessionStore::new();
        sessions.expect_resolve().returning(|_| Ok(Some(viewer())));

        let dispatcher = Dispatcher::new(services(), Arc::new(sessions), Arc::new(limiter))
            .with_permissions(PermissionMatrix::empty());
        let response = dispatcher
            .dispatch(Some("t"), "organization", "summary", Value::Null)
            .await;

        assert_eq!(response.code.as_deref(), Some("FORBIDDEN"));
    }
}
