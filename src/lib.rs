pub mod base;
pub mod config;
pub mod data;
pub mod errors;
pub mod models;
pub mod utils;

// Re-export repository traits
pub use base::repository::{
    DepartmentRepository,
    EmployeeRepository,
    ReviewRepository,
};

pub use config::DatabaseConfig;
pub use data::{Database, Entity, IdentityMap, Shared};
pub use errors::{IdentityMapError, ValidationError};

// Re-export models
pub use models::{
    department::Department,
    employee::Employee,
    ids::{DepartmentId, EmployeeId, ReviewId},
    review::Review,
};
