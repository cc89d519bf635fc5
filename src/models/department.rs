use serde::Serialize;
use std::fmt;

use crate::data::types::Entity;
use crate::errors::ValidationError;
use crate::models::ids::DepartmentId;
use crate::models::validation::non_empty;

/// A row of the `departments` table as read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRow {
    pub id: DepartmentId,
    pub name: String,
    pub location: String,
}

/// Department model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    id: Option<DepartmentId>,
    name: String,
    location: String,
}

impl Department {
    /// Creates a new, unsaved department
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: non_empty("department", "name", name.into())?,
            location: non_empty("department", "location", location.into())?,
        })
    }

    /// Store-assigned id, `None` until saved
    pub fn id(&self) -> Option<DepartmentId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = non_empty("department", "name", name.into())?;
        Ok(())
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> Result<(), ValidationError> {
        self.location = non_empty("department", "location", location.into())?;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: Option<DepartmentId>) {
        self.id = id;
    }
}

impl Entity for Department {
    const NAME: &'static str = "department";

    type Id = DepartmentId;
    type Row = DepartmentRow;

    fn get_id(&self) -> Option<DepartmentId> {
        self.id
    }

    fn row_id(row: &DepartmentRow) -> DepartmentId {
        row.id
    }

    fn from_row(row: DepartmentRow) -> Result<Self, ValidationError> {
        let mut department = Self::new(row.name, row.location)?;
        department.assign_id(Some(row.id));
        Ok(department)
    }

    fn matches_row(&self, row: &DepartmentRow) -> bool {
        self.name == row.name && self.location == row.location
    }

    fn refresh_from_row(&mut self, row: DepartmentRow) -> Result<(), ValidationError> {
        let name = non_empty("department", "name", row.name)?;
        let location = non_empty("department", "location", row.location)?;
        self.name = name;
        self.location = location;
        Ok(())
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Department {}: {}, {}>", id, self.name, self.location),
            None => write!(f, "<Department None: {}, {}>", self.name, self.location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_creation() {
        let department = Department::new("Payroll", "Building A, 5th Floor").unwrap();

        assert_eq!(department.id(), None);
        assert_eq!(department.name(), "Payroll");
        assert_eq!(department.location(), "Building A, 5th Floor");
    }

    #[test]
    fn test_department_rejects_empty_fields() {
        assert_eq!(
            Department::new("", "Building A"),
            Err(ValidationError::EmptyField { entity: "department", field: "name" })
        );
        assert_eq!(
            Department::new("Payroll", ""),
            Err(ValidationError::EmptyField { entity: "department", field: "location" })
        );
    }

    #[test]
    fn test_department_setters_validate() {
        let mut department = Department::new("Payroll", "Building A").unwrap();

        department.set_name("Human Resources").unwrap();
        assert_eq!(department.name(), "Human Resources");

        assert!(department.set_location("").is_err());
        assert_eq!(department.location(), "Building A");
    }

    #[test]
    fn test_department_display() {
        let mut department = Department::new("Payroll", "Building A").unwrap();
        assert_eq!(department.to_string(), "<Department None: Payroll, Building A>");

        department.assign_id(Some(DepartmentId(3)));
        assert_eq!(department.to_string(), "<Department 3: Payroll, Building A>");
    }
}
