use serde::Serialize;
use std::fmt;

use crate::data::types::Entity;
use crate::errors::ValidationError;
use crate::models::ids::{EmployeeId, ReviewId};
use crate::models::validation::{non_empty, review_year};

/// A row of the `reviews` table as read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub year: i64,
    pub summary: String,
    pub employee_id: EmployeeId,
}

/// Yearly performance review of an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee_id: EmployeeId,
}

impl Review {
    pub fn new(
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            year: review_year(year)?,
            summary: non_empty("review", "summary", summary.into())?,
            employee_id,
        })
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    pub fn set_year(&mut self, year: i64) -> Result<(), ValidationError> {
        self.year = review_year(year)?;
        Ok(())
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ValidationError> {
        self.summary = non_empty("review", "summary", summary.into())?;
        Ok(())
    }

    pub fn set_employee_id(&mut self, employee_id: EmployeeId) {
        self.employee_id = employee_id;
    }

    pub(crate) fn assign_id(&mut self, id: Option<ReviewId>) {
        self.id = id;
    }
}

impl Entity for Review {
    const NAME: &'static str = "review";

    type Id = ReviewId;
    type Row = ReviewRow;

    fn get_id(&self) -> Option<ReviewId> {
        self.id
    }

    fn row_id(row: &ReviewRow) -> ReviewId {
        row.id
    }

    fn from_row(row: ReviewRow) -> Result<Self, ValidationError> {
        let mut review = Self::new(row.year, row.summary, row.employee_id)?;
        review.assign_id(Some(row.id));
        Ok(review)
    }

    fn matches_row(&self, row: &ReviewRow) -> bool {
        self.year == row.year
            && self.summary == row.summary
            && self.employee_id == row.employee_id
    }

    fn refresh_from_row(&mut self, row: ReviewRow) -> Result<(), ValidationError> {
        let year = review_year(row.year)?;
        let summary = non_empty("review", "summary", row.summary)?;
        self.year = year;
        self.summary = summary;
        self.employee_id = row.employee_id;
        Ok(())
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.map_or_else(|| "None".to_string(), |id| id.to_string());
        write!(
            f,
            "<Review {}: {}, {}, Employee ID: {}>",
            id, self.year, self.summary, self.employee_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_creation() {
        let review = Review::new(2023, "Great work", EmployeeId(1)).unwrap();

        assert_eq!(review.year(), 2023);
        assert_eq!(review.summary(), "Great work");
        assert_eq!(review.employee_id(), EmployeeId(1));
        assert_eq!(review.to_string(), "<Review None: 2023, Great work, Employee ID: 1>");
    }

    #[test]
    fn test_review_rejects_early_year() {
        assert_eq!(
            Review::new(1999, "Great work", EmployeeId(1)),
            Err(ValidationError::YearOutOfRange(1999))
        );

        let mut review = Review::new(2021, "Solid", EmployeeId(1)).unwrap();
        assert!(review.set_year(1990).is_err());
        assert_eq!(review.year(), 2021);
    }

    #[test]
    fn test_review_rejects_empty_summary() {
        assert!(Review::new(2022, "", EmployeeId(1)).is_err());
    }
}
