use thiserror::Error;

/// Raised when an attribute or reference fails validation.
///
/// Every variant is produced before the store is touched, so a failed
/// operation never leaves a partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{entity} {field} must be a non-empty string")]
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("review year must be 2000 or later, got {0}")]
    YearOutOfRange(i64),

    #[error("department_id must be the id of a persisted department, got {0}")]
    UnknownDepartment(i64),

    #[error("employee_id must be the id of a persisted employee, got {0}")]
    UnknownEmployee(i64),

    #[error("{entity} {id} is already persisted")]
    AlreadyPersisted { entity: &'static str, id: i64 },
}

/// Raised when an identity map is asked to evict an entry it does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityMapError {
    #[error("{entity} {} is not in the identity map", display_id(.id))]
    NotCached {
        entity: &'static str,
        id: Option<i64>,
    },

    #[error("{entity} {id} is borrowed and the stored row differs from it")]
    InUse { entity: &'static str, id: i64 },
}

fn display_id(id: &Option<i64>) -> String {
    id.map_or_else(|| "None".to_string(), |id| id.to_string())
}
