use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use log::debug;

use crate::data::types::{Entity, Shared};
use crate::errors::IdentityMapError;

/// Maps primary keys to the one in-memory instance loaded for that row.
///
/// Owned by a repository, so each `Database` session has its own map. The map
/// is never refreshed from the store on its own: a row changed out of band
/// stays stale here until it is read again.
pub struct IdentityMap<T: Entity> {
    entries: RefCell<HashMap<T::Id, Shared<T>>>,
}

impl<T: Entity> IdentityMap<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &T::Id) -> Option<Shared<T>> {
        self.entries.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.entries.borrow().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn register(&self, id: T::Id, instance: Shared<T>) {
        debug!("Caching {} {}", T::NAME, Into::<i64>::into(id));
        self.entries.borrow_mut().insert(id, instance);
    }

    /// Removes the entry for `id`. Evicting an id that is not cached is an error.
    pub fn evict(&self, id: Option<T::Id>) -> std::result::Result<Shared<T>, IdentityMapError> {
        let not_cached = || IdentityMapError::NotCached {
            entity: T::NAME,
            id: id.map(Into::into),
        };
        let id = id.ok_or_else(not_cached)?;
        let evicted = self.entries.borrow_mut().remove(&id).ok_or_else(not_cached)?;
        debug!("Evicted {} {}", T::NAME, Into::<i64>::into(id));
        Ok(evicted)
    }

    /// Merges a freshly read row into the map.
    ///
    /// A cached instance is updated in place and returned, so every holder of
    /// the handle sees the new values. Otherwise a new instance is built and
    /// registered. A cached instance the caller is still borrowing is left
    /// alone when it already matches the row; if it differs, the merge fails
    /// with `IdentityMapError::InUse`.
    pub fn reconcile(&self, row: T::Row) -> Result<Shared<T>> {
        let id = T::row_id(&row);
        let Some(existing) = self.get(&id) else {
            let instance = Rc::new(RefCell::new(T::from_row(row)?));
            self.register(id, Rc::clone(&instance));
            return Ok(instance);
        };

        match existing.try_borrow_mut() {
            Ok(mut instance) => instance.refresh_from_row(row)?,
            Err(_) => {
                let unchanged = existing
                    .try_borrow()
                    .map(|instance| instance.matches_row(&row))
                    .unwrap_or(false);
                if !unchanged {
                    return Err(IdentityMapError::InUse {
                        entity: T::NAME,
                        id: id.into(),
                    }
                    .into());
                }
            }
        }
        Ok(existing)
    }
}

impl<T: Entity> Default for IdentityMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
