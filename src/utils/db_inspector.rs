use anyhow::{Result, Context};
use log::info;
use std::sync::Arc;

use crate::data::database::ConnectionPool;

/// Read-only view over the schema and contents of a database
pub struct DbInspector {
    pool: Arc<ConnectionPool>,
}

impl DbInspector {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Get a list of all tables in the database
    pub fn get_tables(&self) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name"
        ).context("Failed to prepare statement to list tables")?;

        let table_names = stmt.query_map([], |row| row.get(0))
            .context("Failed to query tables")?
            .collect::<std::result::Result<Vec<String>, _>>()
            .context("Failed to collect table names")?;

        Ok(table_names)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            [table_name],
            |row| row.get(0)
        ).context("Failed to check if table exists")?;

        Ok(count > 0)
    }

    /// Get the columns of a specific table
    pub fn get_table_schema(&self, table_name: &str) -> Result<Vec<TableColumn>> {
        if !self.table_exists(table_name)? {
            return Err(anyhow::anyhow!("Table does not exist: {}", table_name));
        }

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT name, type, pk FROM pragma_table_info(?) ORDER BY cid"
        ).context("Failed to prepare statement to get table schema")?;

        let columns = stmt.query_map([table_name], |row| {
            Ok(TableColumn {
                name: row.get(0)?,
                column_type: row.get(1)?,
                pk: row.get(2)?,
            })
        }).context("Failed to query table schema")?
        .collect::<std::result::Result<Vec<TableColumn>, _>>()
        .context("Failed to collect table columns")?;

        Ok(columns)
    }

    /// Get row count for a table
    pub fn get_row_count(&self, table_name: &str) -> Result<i64> {
        // Only names that exist in sqlite_master ever reach the format! below
        if !self.table_exists(table_name)? {
            return Err(anyhow::anyhow!("Table does not exist: {}", table_name));
        }

        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", table_name),
            [],
            |row| row.get(0)
        ).context("Failed to get row count")?;

        Ok(count)
    }

    /// Log a report of the database structure
    pub fn print_database_report(&self) -> Result<()> {
        let tables = self.get_tables()?;
        info!("Database report: {} tables", tables.len());

        for table_name in &tables {
            let row_count = self.get_row_count(table_name)?;
            let columns = self.get_table_schema(table_name)?;

            info!("Table: {} ({} rows)", table_name, row_count);
            for column in &columns {
                let pk_str = if column.pk > 0 { " PRIMARY KEY" } else { "" };
                info!("  - {}: {}{}", column.name, column.column_type, pk_str);
            }
        }

        Ok(())
    }
}

/// Represents a column in a database table
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub name: String,
    pub column_type: String,
    pub pk: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::repository::DepartmentRepository;
    use crate::data::database::Database;

    fn create_test_db() -> Database {
        let database = Database::in_memory().unwrap();
        database.create_tables().unwrap();
        database
    }

    #[test]
    fn test_get_tables() {
        let database = create_test_db();
        let inspector = DbInspector::new(database.pool().clone());

        assert_eq!(
            inspector.get_tables().unwrap(),
            vec!["departments".to_string(), "employees".to_string(), "reviews".to_string()]
        );
    }

    #[test]
    fn test_get_table_schema() {
        let database = create_test_db();
        let inspector = DbInspector::new(database.pool().clone());
        let columns = inspector.get_table_schema("employees").unwrap();

        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "job_title", "department_id"]);

        let pk_column = columns.iter().find(|c| c.pk > 0).unwrap();
        assert_eq!(pk_column.name, "id");
    }

    #[test]
    fn test_get_row_count() {
        let database = create_test_db();
        database.department_repository().create("Payroll", "Building A").unwrap();
        let inspector = DbInspector::new(database.pool().clone());

        assert_eq!(inspector.get_row_count("departments").unwrap(), 1);
        assert!(inspector.get_row_count("nonexistent").is_err());
    }
}
