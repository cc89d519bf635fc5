use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;

use crate::base::repository::{DepartmentRepository, EmployeeRepository, ReviewRepository};
use crate::config::DatabaseConfig;
use crate::data::repositories::{
    SqliteDepartmentRepository, SqliteEmployeeRepository, SqliteReviewRepository,
};
use crate::data::types::Shared;
use crate::models::{Department, Employee, Review};
use crate::utils;

pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// A session over one SQLite database
///
/// Owns the connection pool and one repository per entity. Each repository
/// carries its own identity map, so two `Database` values never hand out the
/// same instance.
pub struct Database {
    pool: Arc<ConnectionPool>,
    departments: SqliteDepartmentRepository,
    employees: SqliteEmployeeRepository,
    reviews: SqliteReviewRepository,
}

impl Database {
    /// Opens (creating if needed) the database file named by `config`
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        utils::ensure_directory_exists(&config.path)?;

        let manager = SqliteConnectionManager::file(&config.path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .build(manager)
            .with_context(|| format!("Failed to open database at {}", config.path.display()))?;

        info!("Opened database at {}", config.path.display());
        Ok(Self::from_pool(Arc::new(pool)))
    }

    /// Opens the database file at `path` with the default pool size
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(&DatabaseConfig::new(path.as_ref()))
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self> {
        // Every :memory: connection is its own database, so keep exactly one.
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .context("Failed to open in-memory database")?;
        Ok(Self::from_pool(Arc::new(pool)))
    }

    fn from_pool(pool: Arc<ConnectionPool>) -> Self {
        let departments = SqliteDepartmentRepository::new(Arc::clone(&pool));
        let employees = SqliteEmployeeRepository::new(Arc::clone(&pool));
        let reviews = SqliteReviewRepository::new(Arc::clone(&pool));

        Self {
            pool,
            departments,
            employees,
            reviews,
        }
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    pub fn department_repository(&self) -> &SqliteDepartmentRepository {
        &self.departments
    }

    pub fn employee_repository(&self) -> &SqliteEmployeeRepository {
        &self.employees
    }

    pub fn review_repository(&self) -> &SqliteReviewRepository {
        &self.reviews
    }

    /// Creates every table, parents first
    pub fn create_tables(&self) -> Result<()> {
        self.departments.create_table()?;
        self.employees.create_table()?;
        self.reviews.create_table()?;
        Ok(())
    }

    /// Drops every table, children first
    pub fn drop_tables(&self) -> Result<()> {
        self.reviews.drop_table()?;
        self.employees.drop_table()?;
        self.departments.drop_table()?;
        Ok(())
    }

    /// Employees working in `department`
    pub fn employees_of(&self, department: &Shared<Department>) -> Result<Vec<Shared<Employee>>> {
        let department_id = department.borrow().id();
        match department_id {
            Some(id) => self.employees.get_by_department(id),
            None => Ok(Vec::new()),
        }
    }

    /// The department `employee` belongs to, if it still exists
    pub fn department_of(&self, employee: &Shared<Employee>) -> Result<Option<Shared<Department>>> {
        let department_id = employee.borrow().department_id();
        self.departments.find_by_id(department_id)
    }

    /// Reviews written for `employee`
    pub fn reviews_of(&self, employee: &Shared<Employee>) -> Result<Vec<Shared<Review>>> {
        let employee_id = employee.borrow().id();
        match employee_id {
            Some(id) => self.reviews.get_by_employee(id),
            None => Ok(Vec::new()),
        }
    }

    /// The employee `review` was written for, if it still exists
    pub fn employee_of(&self, review: &Shared<Review>) -> Result<Option<Shared<Employee>>> {
        let employee_id = review.borrow().employee_id();
        self.employees.find_by_id(employee_id)
    }
}
