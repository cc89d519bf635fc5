pub mod database;
pub mod identity_map;
pub mod repositories;
pub mod types;

pub use database::{ConnectionPool, Database};
pub use identity_map::IdentityMap;
pub use repositories::{
    SqliteDepartmentRepository,
    SqliteEmployeeRepository,
    SqliteReviewRepository,
};
pub use types::{Entity, Shared};
