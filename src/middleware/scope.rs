use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::directory::Directory;
use crate::ids::EntityId;
use crate::middleware::context::RequestContext;
use crate::modules::auth::model::Principal;
use crate::utils::errors::AppError;

/// Header families accepted for scope selection, in priority order within
/// each family. The `x-managed-*` names are what the current frontend
/// sends; the older aliases remain accepted.
const SCHOOL_HEADERS: &[&str] = &["x-managed-school-id", "x-school-id", "school-id"];
const BRANCH_HEADERS: &[&str] = &["x-managed-branch-id", "x-branch-id", "branch-id"];
const COURSE_HEADERS: &[&str] = &["x-managed-course-id", "x-course-id", "course-id"];

/// The tenant scope a request operates in after resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManagedScope {
    pub school_id: Option<EntityId>,
    pub branch_id: Option<EntityId>,
    pub course_id: Option<EntityId>,
}

fn header_id(headers: &HeaderMap, names: &[&str]) -> Option<EntityId> {
    names
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(EntityId::parse_optional)
}

/// Resolve the effective scope for an authenticated request.
///
/// The school comes from the caller's home school unless their role may
/// override it via header; a foreign school header from a non-override role
/// is ignored rather than rejected, so stale frontend state degrades to the
/// caller's own tenant instead of an error. Branch and course selections
/// are always validated against the resolved school, since a wrong one
/// there means data from another tenant.
pub async fn resolve_scope(
    headers: &HeaderMap,
    principal: &Principal,
    directory: &dyn Directory,
) -> Result<ManagedScope, AppError> {
    let requested_school = header_id(headers, SCHOOL_HEADERS);

    let school_id = match (principal.school_id, requested_school) {
        (Some(home), Some(requested)) if requested != home => {
            if principal.role.can_override_school() {
                Some(requested)
            } else {
                tracing::debug!(
                    user_id = %principal.id,
                    requested = %requested,
                    "school override ignored for non-override role"
                );
                Some(home)
            }
        }
        (Some(home), _) => Some(home),
        (None, requested) => requested,
    };

    let branch_id = header_id(headers, BRANCH_HEADERS);
    if let Some(branch) = branch_id {
        match directory.branch_school(branch).await? {
            Some(owner) if Some(owner) == school_id => {}
            Some(_) => {
                return Err(AppError::scope_forbidden(
                    "Branch does not belong to the selected school",
                ));
            }
            None => {
                return Err(AppError::scope_forbidden("Unknown branch"));
            }
        }
    }

    let course_id = header_id(headers, COURSE_HEADERS);
    if let Some(course) = course_id {
        match directory.course_location(course).await? {
            Some(location) if Some(location.school_id) == school_id => {
                if let (Some(selected), Some(owner)) = (branch_id, location.branch_id) {
                    if selected != owner {
                        return Err(AppError::scope_forbidden(
                            "Course does not belong to the selected branch",
                        ));
                    }
                }
            }
            Some(_) => {
                return Err(AppError::scope_forbidden(
                    "Course does not belong to the selected school",
                ));
            }
            None => {
                return Err(AppError::scope_forbidden("Unknown course"));
            }
        }
    }

    Ok(ManagedScope {
        school_id,
        branch_id,
        course_id,
    })
}

/// Extractor for handlers that must run inside a school context. Rejects
/// with `SCOPE_REQUIRED` when no school could be resolved (a platform admin
/// who sent no scope header).
pub struct ScopedUser {
    pub principal: Principal,
    pub school_id: EntityId,
    pub scope: ManagedScope,
}

impl<S> FromRequestParts<S> for ScopedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .ok_or_else(AppError::auth_required)?;
        let school_id = ctx.scope.school_id.ok_or_else(AppError::scope_required)?;
        Ok(ScopedUser {
            principal: ctx.principal.clone(),
            school_id,
            scope: ctx.scope,
        })
    }
}
