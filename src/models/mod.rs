pub mod department;
pub mod employee;
pub mod ids;
pub mod review;
pub mod validation;

pub use department::{Department, DepartmentRow};
pub use employee::{Employee, EmployeeRow};
pub use ids::{DepartmentId, EmployeeId, ReviewId};
pub use review::{Review, ReviewRow};
