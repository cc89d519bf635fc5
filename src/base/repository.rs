use anyhow::Result;

use crate::data::types::Shared;
use crate::models::{
    department::Department,
    employee::Employee,
    ids::{DepartmentId, EmployeeId, ReviewId},
    review::Review,
};

/// Persistence operations for departments
///
/// Every lookup returns the handle held in the repository's identity map, so
/// two reads of the same row yield the same instance.
pub trait DepartmentRepository {
    /// Creates the `departments` table if it does not exist
    fn create_table(&self) -> Result<()>;

    /// Drops the `departments` table if it exists
    fn drop_table(&self) -> Result<()>;

    /// Inserts an unsaved department, assigns its id and caches it
    fn save(&self, department: &Shared<Department>) -> Result<()>;

    /// Builds a department and saves it
    fn create(&self, name: &str, location: &str) -> Result<Shared<Department>>;

    fn find_by_id(&self, id: DepartmentId) -> Result<Option<Shared<Department>>>;

    fn find_by_name(&self, name: &str) -> Result<Option<Shared<Department>>>;

    /// Overwrites the stored row with the instance's current fields
    fn update(&self, department: &Shared<Department>) -> Result<()>;

    /// Removes the row, evicts the instance and resets its id
    fn delete(&self, department: &Shared<Department>) -> Result<()>;

    fn get_all(&self) -> Result<Vec<Shared<Department>>>;
}

/// Persistence operations for employees
pub trait EmployeeRepository {
    fn create_table(&self) -> Result<()>;
    fn drop_table(&self) -> Result<()>;
    fn save(&self, employee: &Shared<Employee>) -> Result<()>;
    fn create(&self, name: &str, job_title: &str, department_id: DepartmentId) -> Result<Shared<Employee>>;
    fn find_by_id(&self, id: EmployeeId) -> Result<Option<Shared<Employee>>>;
    fn find_by_name(&self, name: &str) -> Result<Option<Shared<Employee>>>;
    fn update(&self, employee: &Shared<Employee>) -> Result<()>;
    fn delete(&self, employee: &Shared<Employee>) -> Result<()>;
    fn get_all(&self) -> Result<Vec<Shared<Employee>>>;

    /// Employees whose `department_id` matches, found by scanning every row
    fn get_by_department(&self, department_id: DepartmentId) -> Result<Vec<Shared<Employee>>>;
}

/// Persistence operations for reviews
pub trait ReviewRepository {
    fn create_table(&self) -> Result<()>;
    fn drop_table(&self) -> Result<()>;
    fn save(&self, review: &Shared<Review>) -> Result<()>;
    fn create(&self, year: i64, summary: &str, employee_id: EmployeeId) -> Result<Shared<Review>>;
    fn find_by_id(&self, id: ReviewId) -> Result<Option<Shared<Review>>>;
    fn update(&self, review: &Shared<Review>) -> Result<()>;
    fn delete(&self, review: &Shared<Review>) -> Result<()>;
    fn get_all(&self) -> Result<Vec<Shared<Review>>>;

    /// Reviews whose `employee_id` matches, found by scanning every row
    fn get_by_employee(&self, employee_id: EmployeeId) -> Result<Vec<Shared<Review>>>;
}
