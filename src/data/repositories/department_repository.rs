use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, OptionalExtension, Row};

use crate::base::repository::DepartmentRepository;
use crate::data::database::ConnectionPool;
use crate::data::identity_map::IdentityMap;
use crate::data::types::Shared;
use crate::errors::ValidationError;
use crate::models::department::{Department, DepartmentRow};
use crate::models::ids::DepartmentId;

/// SQLite implementation of the DepartmentRepository trait
pub struct SqliteDepartmentRepository {
    pool: Arc<ConnectionPool>,
    cache: IdentityMap<Department>,
}

impl SqliteDepartmentRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            cache: IdentityMap::new(),
        }
    }

    /// The identity map backing this repository
    pub fn cache(&self) -> &IdentityMap<Department> {
        &self.cache
    }

    fn map_row(row: &Row) -> rusqlite::Result<DepartmentRow> {
        Ok(DepartmentRow {
            id: row.get(0)?,
            name: row.get(1)?,
            location: row.get(2)?,
        })
    }

    fn load_rows(&self) -> Result<Vec<DepartmentRow>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id, name, location FROM departments ORDER BY id")?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read departments")?;
        Ok(rows)
    }

    fn find_one(&self, sql: &str, param: &dyn rusqlite::ToSql) -> Result<Option<Shared<Department>>> {
        let row = {
            let conn = self.pool.get()?;
            conn.query_row(sql, [param], Self::map_row)
                .optional()
                .context("Failed to query departments")?
        };

        match row {
            Some(row) => Ok(Some(self.cache.reconcile(row)?)),
            None => Ok(None),
        }
    }
}

impl DepartmentRepository for SqliteDepartmentRepository {
    fn create_table(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY,
                name TEXT,
                location TEXT
            )",
            [],
        )
        .context("Failed to create departments table")?;
        info!("Ensured departments table exists");
        Ok(())
    }

    fn drop_table(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DROP TABLE IF EXISTS departments", [])
            .context("Failed to drop departments table")?;
        info!("Dropped departments table");
        Ok(())
    }

    fn save(&self, department: &Shared<Department>) -> Result<()> {
        if let Some(id) = department.borrow().id() {
            return Err(ValidationError::AlreadyPersisted { entity: "department", id: id.0 }.into());
        }

        let id = {
            let department = department.borrow();
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO departments (name, location) VALUES (?, ?)",
                params![department.name(), department.location()],
            )
            .context("Failed to insert department")?;
            let rowid = conn.last_insert_rowid();
            DepartmentId(rowid)
        };

        department.borrow_mut().assign_id(Some(id));
        self.cache.register(id, Rc::clone(department));
        debug!("Saved department {}", id);
        Ok(())
    }

    fn create(&self, name: &str, location: &str) -> Result<Shared<Department>> {
        let department = Rc::new(RefCell::new(Department::new(name, location)?));
        self.save(&department)?;
        Ok(department)
    }

    fn find_by_id(&self, id: DepartmentId) -> Result<Option<Shared<Department>>> {
        self.find_one("SELECT id, name, location FROM departments WHERE id = ?", &id)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Shared<Department>>> {
        self.find_one(
            "SELECT id, name, location FROM departments WHERE name = ? ORDER BY id LIMIT 1",
            &name,
        )
    }

    fn update(&self, department: &Shared<Department>) -> Result<()> {
        let department = department.borrow();
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "UPDATE departments SET name = ?, location = ? WHERE id = ?",
                params![department.name(), department.location(), department.id()],
            )
            .context("Failed to update department")?;

        if affected == 0 {
            debug!("Update of {} matched no rows", department);
        }
        Ok(())
    }

    fn delete(&self, department: &Shared<Department>) -> Result<()> {
        let id = department.borrow().id();
        if let Some(id) = id {
            let conn = self.pool.get()?;
            conn.execute("DELETE FROM departments WHERE id = ?", params![id])
                .with_context(|| format!("Failed to delete department {}", id))?;
        }

        self.cache.evict(id)?;
        department.borrow_mut().assign_id(None);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Shared<Department>>> {
        let rows = self.load_rows()?;

        let mut departments = Vec::with_capacity(rows.len());
        for row in rows {
            departments.push(self.cache.reconcile(row)?);
        }
        Ok(departments)
    }
}
