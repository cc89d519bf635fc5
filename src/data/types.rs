use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use rusqlite::types::{FromSql, ToSql};

use crate::errors::ValidationError;

/// Handle to the single live instance of a persisted row.
pub type Shared<T> = Rc<RefCell<T>>;

/// A model backed by one table row.
///
/// `Row` is the raw column tuple read from the store; `from_row` and
/// `refresh_from_row` turn it into (or merge it into) a validated model.
pub trait Entity: Sized {
    /// Human-readable entity name used in errors and logs.
    const NAME: &'static str;

    type Id: FromSql + ToSql + Copy + Eq + Hash + Into<i64>;
    type Row;

    fn get_id(&self) -> Option<Self::Id>;

    fn row_id(row: &Self::Row) -> Self::Id;

    /// Builds a fresh instance carrying the row's id.
    fn from_row(row: Self::Row) -> Result<Self, ValidationError>;

    /// Whether the instance already holds every field of `row`.
    fn matches_row(&self, row: &Self::Row) -> bool;

    /// Overwrites the mutable fields in place. Nothing is assigned unless
    /// every field validates.
    fn refresh_from_row(&mut self, row: Self::Row) -> Result<(), ValidationError>;
}
