use crate::errors::ValidationError;

/// Earliest year a review may be filed for.
pub const MIN_REVIEW_YEAR: i64 = 2000;

/// Accepts any string except the empty one.
pub(crate) fn non_empty(
    entity: &'static str,
    field: &'static str,
    value: String,
) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(value)
}

pub(crate) fn review_year(year: i64) -> Result<i64, ValidationError> {
    if year < MIN_REVIEW_YEAR {
        return Err(ValidationError::YearOutOfRange(year));
    }
    Ok(year)
}
