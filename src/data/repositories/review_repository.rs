use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, OptionalExtension, Row};

use crate::base::repository::ReviewRepository;
use crate::data::database::ConnectionPool;
use crate::data::identity_map::IdentityMap;
use crate::data::types::Shared;
use crate::errors::ValidationError;
use crate::models::ids::{EmployeeId, ReviewId};
use crate::models::review::{Review, ReviewRow};

/// SQLite implementation of the ReviewRepository trait
pub struct SqliteReviewRepository {
    pool: Arc<ConnectionPool>,
    cache: IdentityMap<Review>,
}

impl SqliteReviewRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            cache: IdentityMap::new(),
        }
    }

    pub fn cache(&self) -> &IdentityMap<Review> {
        &self.cache
    }

    fn map_row(row: &Row) -> rusqlite::Result<ReviewRow> {
        Ok(ReviewRow {
            id: row.get(0)?,
            year: row.get(1)?,
            summary: row.get(2)?,
            employee_id: row.get(3)?,
        })
    }

    fn load_rows(&self) -> Result<Vec<ReviewRow>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id, year, summary, employee_id FROM reviews ORDER BY id")?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read reviews")?;
        Ok(rows)
    }

    /// Checks the referenced row exists without loading it into any cache
    fn ensure_employee_exists(&self, employee_id: EmployeeId) -> Result<()> {
        let conn = self.pool.get()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM employees WHERE id = ?",
                params![employee_id],
                |_| Ok(()),
            )
            .optional()
            .context("Failed to look up employees")?
            .is_some();

        if !exists {
            return Err(ValidationError::UnknownEmployee(employee_id.0).into());
        }
        Ok(())
    }
}

impl ReviewRepository for SqliteReviewRepository {
    fn create_table(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                year INT,
                summary TEXT,
                employee_id INTEGER,
                FOREIGN KEY (employee_id) REFERENCES employees(id)
            )",
            [],
        )
        .context("Failed to create reviews table")?;
        info!("Ensured reviews table exists");
        Ok(())
    }

    fn drop_table(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DROP TABLE IF EXISTS reviews", [])
            .context("Failed to drop reviews table")?;
        info!("Dropped reviews table");
        Ok(())
    }

    fn save(&self, review: &Shared<Review>) -> Result<()> {
        let (existing_id, employee_id) = {
            let review = review.borrow();
            (review.id(), review.employee_id())
        };
        if let Some(id) = existing_id {
            return Err(ValidationError::AlreadyPersisted { entity: "review", id: id.0 }.into());
        }
        self.ensure_employee_exists(employee_id)?;

        let id = {
            let review = review.borrow();
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO reviews (year, summary, employee_id) VALUES (?, ?, ?)",
                params![review.year(), review.summary(), review.employee_id()],
            )
            .context("Failed to insert review")?;
            let rowid = conn.last_insert_rowid();
            ReviewId(rowid)
        };

        review.borrow_mut().assign_id(Some(id));
        self.cache.register(id, Rc::clone(review));
        debug!("Saved review {}", id);
        Ok(())
    }

    fn create(&self, year: i64, summary: &str, employee_id: EmployeeId) -> Result<Shared<Review>> {
        let review = Rc::new(RefCell::new(Review::new(year, summary, employee_id)?));
        self.save(&review)?;
        Ok(review)
    }

    fn find_by_id(&self, id: ReviewId) -> Result<Option<Shared<Review>>> {
        let row = {
            let conn = self.pool.get()?;
            conn.query_row(
                "SELECT id, year, summary, employee_id FROM reviews WHERE id = ?",
                params![id],
                Self::map_row,
            )
            .optional()
            .context("Failed to query reviews")?
        };

        match row {
            Some(row) => Ok(Some(self.cache.reconcile(row)?)),
            None => Ok(None),
        }
    }

    fn update(&self, review: &Shared<Review>) -> Result<()> {
        let employee_id = review.borrow().employee_id();
        self.ensure_employee_exists(employee_id)?;

        let review = review.borrow();
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "UPDATE reviews SET year = ?, summary = ?, employee_id = ? WHERE id = ?",
                params![review.year(), review.summary(), review.employee_id(), review.id()],
            )
            .context("Failed to update review")?;

        if affected == 0 {
            debug!("Update of {} matched no rows", review);
        }
        Ok(())
    }

    fn delete(&self, review: &Shared<Review>) -> Result<()> {
        let id = review.borrow().id();
        if let Some(id) = id {
            let conn = self.pool.get()?;
            conn.execute("DELETE FROM reviews WHERE id = ?", params![id])
                .with_context(|| format!("Failed to delete review {}", id))?;
        }

        self.cache.evict(id)?;
        review.borrow_mut().assign_id(None);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Shared<Review>>> {
        let rows = self.load_rows()?;

        rows.into_iter()
            .map(|row| self.cache.reconcile(row))
            .collect()
    }

    fn get_by_employee(&self, employee_id: EmployeeId) -> Result<Vec<Shared<Review>>> {
        let reviews = self.get_all()?;
        Ok(reviews
            .into_iter()
            .filter(|review| review.borrow().employee_id() == employee_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::repository::{DepartmentRepository, EmployeeRepository};
    use crate::data::database::Database;

    fn setup() -> (Database, EmployeeId) {
        let database = Database::in_memory().unwrap();
        database.create_tables().unwrap();
        let department = database
            .department_repository()
            .create("Payroll", "Building A")
            .unwrap();
        let department_id = department.borrow().id().unwrap();
        let employee = database
            .employee_repository()
            .create("Lee", "Manager", department_id)
            .unwrap();
        let employee_id = employee.borrow().id().unwrap();
        (database, employee_id)
    }

    #[test]
    fn test_create_and_find() {
        let (database, employee_id) = setup();
        let repository = database.review_repository();

        let review = repository.create(2023, "Great work", employee_id).unwrap();
        let id = review.borrow().id().unwrap();

        let found = repository.find_by_id(id).unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &review));
    }

    #[test]
    fn test_create_with_unknown_employee_fails() {
        let (database, _) = setup();
        let repository = database.review_repository();

        let err = repository.create(2023, "Great work", EmployeeId(77)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownEmployee(77))
        );
        assert!(repository.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_create_with_early_year_fails() {
        let (database, employee_id) = setup();
        let repository = database.review_repository();

        let err = repository.create(1995, "Great work", employee_id).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::YearOutOfRange(1995))
        );
    }

    #[test]
    fn test_update_and_delete() {
        let (database, employee_id) = setup();
        let repository = database.review_repository();
        let review = repository.create(2022, "Good", employee_id).unwrap();
        let id = review.borrow().id().unwrap();

        review.borrow_mut().set_summary("Excellent").unwrap();
        repository.update(&review).unwrap();
        repository.cache().evict(Some(id)).unwrap();

        let reloaded = repository.find_by_id(id).unwrap().unwrap();
        assert!(!Rc::ptr_eq(&reloaded, &review));
        assert_eq!(reloaded.borrow().summary(), "Excellent");

        repository.delete(&reloaded).unwrap();
        assert!(repository.find_by_id(id).unwrap().is_none());
    }

    #[test]
    fn test_get_by_employee() {
        let (database, employee_id) = setup();
        let repository = database.review_repository();
        repository.create(2022, "Good", employee_id).unwrap();
        repository.create(2023, "Better", employee_id).unwrap();

        let reviews = repository.get_by_employee(employee_id).unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(repository.get_by_employee(EmployeeId(99)).unwrap().is_empty());
    }
}
