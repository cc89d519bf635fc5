mod department_repository;
mod employee_repository;
mod review_repository;

pub use department_repository::SqliteDepartmentRepository;
pub use employee_repository::SqliteEmployeeRepository;
pub use review_repository::SqliteReviewRepository;
