use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, OptionalExtension, Row};

use crate::base::repository::EmployeeRepository;
use crate::data::database::ConnectionPool;
use crate::data::identity_map::IdentityMap;
use crate::data::types::Shared;
use crate::errors::ValidationError;
use crate::models::employee::{Employee, EmployeeRow};
use crate::models::ids::{DepartmentId, EmployeeId};

/// SQLite implementation of the EmployeeRepository trait
///
/// `department_id` is checked against the `departments` table on every write.
pub struct SqliteEmployeeRepository {
    pool: Arc<ConnectionPool>,
    cache: IdentityMap<Employee>,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            cache: IdentityMap::new(),
        }
    }

    pub fn cache(&self) -> &IdentityMap<Employee> {
        &self.cache
    }

    fn map_row(row: &Row) -> rusqlite::Result<EmployeeRow> {
        Ok(EmployeeRow {
            id: row.get(0)?,
            name: row.get(1)?,
            job_title: row.get(2)?,
            department_id: row.get(3)?,
        })
    }

    fn load_rows(&self) -> Result<Vec<EmployeeRow>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id, name, job_title, department_id FROM employees ORDER BY id")?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read employees")?;
        Ok(rows)
    }

    /// Checks the referenced row exists without loading it into any cache
    fn ensure_department_exists(&self, department_id: DepartmentId) -> Result<()> {
        let conn = self.pool.get()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM departments WHERE id = ?",
                params![department_id],
                |_| Ok(()),
            )
            .optional()
            .context("Failed to look up departments")?
            .is_some();

        if !exists {
            return Err(ValidationError::UnknownDepartment(department_id.0).into());
        }
        Ok(())
    }

    fn find_one(&self, sql: &str, param: &dyn rusqlite::ToSql) -> Result<Option<Shared<Employee>>> {
        let row = {
            let conn = self.pool.get()?;
            conn.query_row(sql, [param], Self::map_row)
                .optional()
                .context("Failed to query employees")?
        };

        match row {
            Some(row) => Ok(Some(self.cache.reconcile(row)?)),
            None => Ok(None),
        }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository {
    fn create_table(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                name TEXT,
                job_title TEXT,
                department_id INTEGER,
                FOREIGN KEY (department_id) REFERENCES departments(id)
            )",
            [],
        )
        .context("Failed to create employees table")?;
        info!("Ensured employees table exists");
        Ok(())
    }

    fn drop_table(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DROP TABLE IF EXISTS employees", [])
            .context("Failed to drop employees table")?;
        info!("Dropped employees table");
        Ok(())
    }

    fn save(&self, employee: &Shared<Employee>) -> Result<()> {
        let (existing_id, department_id) = {
            let employee = employee.borrow();
            (employee.id(), employee.department_id())
        };
        if let Some(id) = existing_id {
            return Err(ValidationError::AlreadyPersisted { entity: "employee", id: id.0 }.into());
        }
        self.ensure_department_exists(department_id)?;

        let id = {
            let employee = employee.borrow();
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO employees (name, job_title, department_id) VALUES (?, ?, ?)",
                params![employee.name(), employee.job_title(), employee.department_id()],
            )
            .context("Failed to insert employee")?;
            let rowid = conn.last_insert_rowid();
            EmployeeId(rowid)
        };

        employee.borrow_mut().assign_id(Some(id));
        self.cache.register(id, Rc::clone(employee));
        debug!("Saved employee {}", id);
        Ok(())
    }

    fn create(&self, name: &str, job_title: &str, department_id: DepartmentId) -> Result<Shared<Employee>> {
        let employee = Rc::new(RefCell::new(Employee::new(name, job_title, department_id)?));
        self.save(&employee)?;
        Ok(employee)
    }

    fn find_by_id(&self, id: EmployeeId) -> Result<Option<Shared<Employee>>> {
        self.find_one(
            "SELECT id, name, job_title, department_id FROM employees WHERE id = ?",
            &id,
        )
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Shared<Employee>>> {
        self.find_one(
            "SELECT id, name, job_title, department_id FROM employees
             WHERE name = ? ORDER BY id LIMIT 1",
            &name,
        )
    }

    fn update(&self, employee: &Shared<Employee>) -> Result<()> {
        let department_id = employee.borrow().department_id();
        self.ensure_department_exists(department_id)?;

        let employee = employee.borrow();
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "UPDATE employees SET name = ?, job_title = ?, department_id = ? WHERE id = ?",
                params![
                    employee.name(),
                    employee.job_title(),
                    employee.department_id(),
                    employee.id()
                ],
            )
            .context("Failed to update employee")?;

        if affected == 0 {
            debug!("Update of {} matched no rows", employee);
        }
        Ok(())
    }

    fn delete(&self, employee: &Shared<Employee>) -> Result<()> {
        let id = employee.borrow().id();
        if let Some(id) = id {
            let conn = self.pool.get()?;
            conn.execute("DELETE FROM employees WHERE id = ?", params![id])
                .with_context(|| format!("Failed to delete employee {}", id))?;
        }

        self.cache.evict(id)?;
        employee.borrow_mut().assign_id(None);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Shared<Employee>>> {
        let rows = self.load_rows()?;

        rows.into_iter()
            .map(|row| self.cache.reconcile(row))
            .collect()
    }

    fn get_by_department(&self, department_id: DepartmentId) -> Result<Vec<Shared<Employee>>> {
        let employees = self.get_all()?;
        Ok(employees
            .into_iter()
            .filter(|employee| employee.borrow().department_id() == department_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::repository::DepartmentRepository;
    use crate::data::database::Database;

    fn setup() -> (Database, DepartmentId) {
        let database = Database::in_memory().unwrap();
        database.create_tables().unwrap();
        let department = database
            .department_repository()
            .create("Payroll", "Building A")
            .unwrap();
        let id = department.borrow().id().unwrap();
        (database, id)
    }

    fn employee_count(database: &Database) -> i64 {
        let conn = database.pool().get().unwrap();
        conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_with_unknown_department_fails_before_insert() {
        let (database, _) = setup();
        let repository = database.employee_repository();

        let err = repository.create("Lee", "Manager", DepartmentId(99)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownDepartment(99))
        );
        assert_eq!(employee_count(&database), 0);
    }

    #[test]
    fn test_create_with_empty_name_fails_before_insert() {
        let (database, department_id) = setup();
        let repository = database.employee_repository();

        let err = repository.create("", "Manager", department_id).unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
        assert_eq!(employee_count(&database), 0);
    }

    #[test]
    fn test_update_with_unknown_department_is_rejected() {
        let (database, department_id) = setup();
        let repository = database.employee_repository();
        let employee = repository.create("Lee", "Manager", department_id).unwrap();

        employee.borrow_mut().set_department_id(DepartmentId(42));
        let err = repository.update(&employee).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownDepartment(42))
        );

        // The stored row is untouched, so a re-read restores the cached instance
        let id = employee.borrow().id().unwrap();
        let found = repository.find_by_id(id).unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &employee));
        assert_eq!(employee.borrow().department_id(), department_id);
    }

    #[test]
    fn test_find_by_name_returns_cached_instance() {
        let (database, department_id) = setup();
        let repository = database.employee_repository();
        let employee = repository.create("Lee", "Manager", department_id).unwrap();

        let found = repository.find_by_name("Lee").unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &employee));
    }

    #[test]
    fn test_find_by_name_prefers_lowest_id() {
        let (database, department_id) = setup();
        let repository = database.employee_repository();
        let first = repository.create("Lee", "Manager", department_id).unwrap();
        let second = repository.create("Lee", "Clerk", department_id).unwrap();
        assert!(first.borrow().id() < second.borrow().id());

        let found = repository.find_by_name("Lee").unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &first));
    }

    #[test]
    fn test_department_check_does_not_load_department() {
        let (database, department_id) = setup();
        let departments = database.department_repository();
        departments.cache().evict(Some(department_id)).unwrap();

        database
            .employee_repository()
            .create("Lee", "Manager", department_id)
            .unwrap();
        assert!(departments.cache().is_empty());
    }

    #[test]
    fn test_get_by_department() {
        let (database, payroll_id) = setup();
        let hr = database
            .department_repository()
            .create("Human Resources", "Building C")
            .unwrap();
        let hr_id = hr.borrow().id().unwrap();
        let repository = database.employee_repository();

        repository.create("Lee", "Manager", payroll_id).unwrap();
        repository.create("Sasha", "Manager", hr_id).unwrap();

        let staff = repository.get_by_department(hr_id).unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].borrow().name(), "Sasha");
    }

    #[test]
    fn test_delete_twice_fails() {
        let (database, department_id) = setup();
        let repository = database.employee_repository();
        let employee = repository.create("Lee", "Manager", department_id).unwrap();

        repository.delete(&employee).unwrap();
        let err = repository.delete(&employee).unwrap_err();
        assert!(err.downcast_ref::<crate::errors::IdentityMapError>().is_some());
    }
}
