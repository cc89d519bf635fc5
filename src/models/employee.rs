use serde::Serialize;
use std::fmt;

use crate::data::types::Entity;
use crate::errors::ValidationError;
use crate::models::ids::{DepartmentId, EmployeeId};
use crate::models::validation::non_empty;

/// A row of the `employees` table as read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: EmployeeId,
    pub name: String,
    pub job_title: String,
    pub department_id: DepartmentId,
}

/// Employee model
///
/// `department_id` is only checked against the store when the employee is
/// written; see `SqliteEmployeeRepository`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: Option<EmployeeId>,
    name: String,
    job_title: String,
    department_id: DepartmentId,
}

impl Employee {
    /// Creates a new, unsaved employee
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
        department_id: DepartmentId,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: non_empty("employee", "name", name.into())?,
            job_title: non_empty("employee", "job_title", job_title.into())?,
            department_id,
        })
    }

    pub fn id(&self) -> Option<EmployeeId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn department_id(&self) -> DepartmentId {
        self.department_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = non_empty("employee", "name", name.into())?;
        Ok(())
    }

    pub fn set_job_title(&mut self, job_title: impl Into<String>) -> Result<(), ValidationError> {
        self.job_title = non_empty("employee", "job_title", job_title.into())?;
        Ok(())
    }

    pub fn set_department_id(&mut self, department_id: DepartmentId) {
        self.department_id = department_id;
    }

    pub(crate) fn assign_id(&mut self, id: Option<EmployeeId>) {
        self.id = id;
    }
}

impl Entity for Employee {
    const NAME: &'static str = "employee";

    type Id = EmployeeId;
    type Row = EmployeeRow;

    fn get_id(&self) -> Option<EmployeeId> {
        self.id
    }

    fn row_id(row: &EmployeeRow) -> EmployeeId {
        row.id
    }

    fn from_row(row: EmployeeRow) -> Result<Self, ValidationError> {
        let mut employee = Self::new(row.name, row.job_title, row.department_id)?;
        employee.assign_id(Some(row.id));
        Ok(employee)
    }

    fn matches_row(&self, row: &EmployeeRow) -> bool {
        self.name == row.name
            && self.job_title == row.job_title
            && self.department_id == row.department_id
    }

    fn refresh_from_row(&mut self, row: EmployeeRow) -> Result<(), ValidationError> {
        let name = non_empty("employee", "name", row.name)?;
        let job_title = non_empty("employee", "job_title", row.job_title)?;
        self.name = name;
        self.job_title = job_title;
        self.department_id = row.department_id;
        Ok(())
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.map_or_else(|| "None".to_string(), |id| id.to_string());
        write!(
            f,
            "<Employee {}: {}, {}, Department ID: {}>",
            id, self.name, self.job_title, self.department_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_creation() {
        let employee = Employee::new("Lee", "Manager", DepartmentId(1)).unwrap();

        assert_eq!(employee.id(), None);
        assert_eq!(employee.name(), "Lee");
        assert_eq!(employee.job_title(), "Manager");
        assert_eq!(employee.department_id(), DepartmentId(1));
    }

    #[test]
    fn test_employee_rejects_empty_job_title() {
        assert_eq!(
            Employee::new("Lee", "", DepartmentId(1)),
            Err(ValidationError::EmptyField { entity: "employee", field: "job_title" })
        );
    }

    #[test]
    fn test_refresh_from_row_is_all_or_nothing() {
        let mut employee = Employee::new("Lee", "Manager", DepartmentId(1)).unwrap();
        let row = EmployeeRow {
            id: EmployeeId(1),
            name: "Sasha".to_string(),
            job_title: String::new(),
            department_id: DepartmentId(2),
        };

        assert!(employee.refresh_from_row(row).is_err());
        assert_eq!(employee.name(), "Lee");
        assert_eq!(employee.department_id(), DepartmentId(1));
    }

    #[test]
    fn test_employee_display() {
        let mut employee = Employee::new("Lee", "Manager", DepartmentId(2)).unwrap();
        employee.assign_id(Some(EmployeeId(5)));
        assert_eq!(employee.to_string(), "<Employee 5: Lee, Manager, Department ID: 2>");
    }
}
