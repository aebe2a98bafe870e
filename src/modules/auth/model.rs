use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::EntityId;

/// Closed set of platform roles.
///
/// Wire format is SCREAMING_SNAKE_CASE, matching the role strings issued in
/// tokens by every other service in the platform. Authorization decisions
/// key off this enum (and the capability table below), never off raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperDuperAdmin,
    SuperAdmin,
    SchoolAdmin,
    BranchManager,
    CourseManager,
    Teacher,
    Staff,
    Accountant,
    Hrm,
    Librarian,
    Parent,
    Student,
}

impl Role {
    /// Platform-level administrators operate across tenants.
    pub fn is_platform_admin(&self) -> bool {
        matches!(self, Role::SuperDuperAdmin | Role::SuperAdmin)
    }

    /// Roles allowed to select a school other than their home school via
    /// the managed-context headers. Everyone else is pinned to their home
    /// school no matter what the headers say.
    pub fn can_override_school(&self) -> bool {
        matches!(
            self,
            Role::SuperDuperAdmin
                | Role::SuperAdmin
                | Role::SchoolAdmin
                | Role::Teacher
                | Role::BranchManager
        )
    }

    /// Static capability table: role -> allowed actions.
    ///
    /// `"*"` grants everything. Checked once during scope resolution;
    /// domain handlers receive the verdict instead of re-deriving it.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::SuperDuperAdmin => &["*"],
            Role::SuperAdmin => &[
                "school:create",
                "school:read",
                "school:update",
                "school:delete",
                "user:create",
                "user:read",
                "user:update",
                "user:delete",
                "audit:read",
                "system:settings",
            ],
            Role::SchoolAdmin => &[
                "school:read",
                "school:update",
                "user:create",
                "user:read",
                "user:update",
                "user:delete",
                "class:create",
                "class:read",
                "class:update",
                "class:delete",
                "grade:read",
                "grade:update",
                "payment:read",
                "payment:update",
                "audit:read",
            ],
            Role::BranchManager => &[
                "branch:read",
                "branch:update",
                "user:read",
                "user:update",
                "class:create",
                "class:read",
                "class:update",
                "grade:read",
                "grade:update",
                "report:read",
            ],
            Role::CourseManager => &[
                "course:create",
                "course:read",
                "course:update",
                "course:delete",
                "class:read",
                "class:update",
                "grade:read",
                "grade:update",
                "report:read",
            ],
            Role::Teacher => &[
                "school:read",
                "user:read",
                "class:read",
                "class:update",
                "student:read",
                "student:update",
                "attendance:create",
                "attendance:read",
                "attendance:update",
                "grade:create",
                "grade:read",
                "grade:update",
                "assignment:create",
                "assignment:read",
                "assignment:update",
            ],
            Role::Staff => &[
                "school:read",
                "user:read",
                "class:read",
                "student:read",
                "attendance:read",
                "grade:read",
            ],
            Role::Accountant => &[
                "school:read",
                "user:read",
                "payment:create",
                "payment:read",
                "payment:update",
                "fee:create",
                "fee:read",
                "fee:update",
                "payroll:read",
                "payroll:update",
            ],
            Role::Hrm => &[
                "school:read",
                "user:read",
                "staff:create",
                "staff:read",
                "staff:update",
                "attendance:read",
                "attendance:update",
                "report:read",
            ],
            Role::Librarian => &[
                "school:read",
                "user:read",
                "book:create",
                "book:read",
                "book:update",
                "book:delete",
            ],
            Role::Parent => &[
                "school:read",
                "student:read",
                "attendance:read",
                "grade:read",
                "fee:read",
                "payment:read",
                "message:create",
                "message:read",
            ],
            Role::Student => &[
                "school:read",
                "class:read",
                "attendance:read",
                "grade:read",
                "assignment:read",
                "assignment:submit",
            ],
        }
    }

    pub fn has_permission(&self, action: &str) -> bool {
        let perms = self.permissions();
        perms.contains(&"*") || perms.contains(&action)
    }
}

/// JWT claims for access tokens.
///
/// `sub` is the user id as a decimal string so the token survives JSON
/// tooling that cannot represent 64-bit integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (subject claim), decimal string
    pub sub: String,
    /// Role granted at login
    pub role: Role,
    /// Home school (None only for platform admins)
    pub school_id: Option<EntityId>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
}

/// The authenticated caller, valid for one request.
///
/// Built from verified [`Claims`]; never persisted (audit records reference
/// it by id only).
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: EntityId,
    pub role: Role,
    pub school_id: Option<EntityId>,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        let id = claims.sub.parse::<EntityId>().ok()?;
        Some(Self {
            id,
            role: claims.role,
            school_id: claims.school_id,
            issued_at: claims.iat as i64,
            expires_at: claims.exp as i64,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub user_id: EntityId,
    pub role: Role,
    pub school_id: Option<EntityId>,
}
