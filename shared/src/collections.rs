//! In-memory caches mirroring the backend.
//!
//! Writes go remote first: the `*_request` methods only describe the call, and the matching
//! `confirm_*` method touches the cache once the shell reports success.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::capabilities::HttpRequest;
use crate::form::FormState;
use crate::model::{
    Employee, EmployeeId, ImageId, ReceivedValentines, UploadFile, Valentine, ValentineId,
    ValentineImage,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u64 },
}

pub trait Keyed {
    type Key: Copy + Eq + std::hash::Hash + Into<u64>;
    const ENTITY: &'static str;

    fn key(&self) -> Self::Key;
}

impl Keyed for Employee {
    type Key = EmployeeId;
    const ENTITY: &'static str = "Employee";

    fn key(&self) -> EmployeeId {
        self.id
    }
}

impl Keyed for ValentineImage {
    type Key = ImageId;
    const ENTITY: &'static str = "ValentineImage";

    fn key(&self) -> ImageId {
        self.id
    }
}

impl Keyed for Valentine {
    type Key = ValentineId;
    const ENTITY: &'static str = "Valentine";

    fn key(&self) -> ValentineId {
        self.id
    }
}

/// Insertion-ordered cache with an id index.
#[derive(Debug, Clone)]
pub struct IdCache<T: Keyed> {
    items: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Keyed> Default for IdCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> IdCache<T> {
    /// Later duplicates replace earlier ones in place.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items.clear();
        self.index.clear();
        for item in items {
            self.insert(item);
        }
    }

    pub fn insert(&mut self, item: T) {
        let key = item.key();
        if let Some(&pos) = self.index.get(&key) {
            self.items[pos] = item;
        } else {
            self.index.insert(key, self.items.len());
            self.items.push(item);
        }
    }

    pub fn get(&self, key: T::Key) -> Result<&T, CollectionError> {
        self.index
            .get(&key)
            .map(|&pos| &self.items[pos])
            .ok_or(CollectionError::NotFound {
                entity: T::ENTITY,
                id: key.into(),
            })
    }

    pub fn get_mut(&mut self, key: T::Key) -> Result<&mut T, CollectionError> {
        match self.index.get(&key) {
            Some(&pos) => Ok(&mut self.items[pos]),
            None => Err(CollectionError::NotFound {
                entity: T::ENTITY,
                id: key.into(),
            }),
        }
    }

    #[must_use]
    pub fn contains(&self, key: T::Key) -> bool {
        self.index.contains_key(&key)
    }

    pub fn remove(&mut self, key: T::Key) -> Result<T, CollectionError> {
        let pos = self.index.remove(&key).ok_or(CollectionError::NotFound {
            entity: T::ENTITY,
            id: key.into(),
        })?;
        let removed = self.items.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Ok(removed)
    }

    #[must_use]
    pub fn all(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// --- Employees ---

#[derive(Debug, Clone, Default)]
pub struct EmployeeCollection {
    cache: IdCache<Employee>,
}

impl EmployeeCollection {
    pub fn load_all(&mut self, employees: Vec<Employee>) {
        self.cache.replace_all(employees);
    }

    pub fn get_by_id(&self, id: EmployeeId) -> Result<&Employee, CollectionError> {
        self.cache.get(id)
    }

    #[must_use]
    pub fn all(&self) -> &[Employee] {
        self.cache.all()
    }

    #[must_use]
    pub fn current_employee(&self, id: Option<EmployeeId>) -> Option<&Employee> {
        id.and_then(|id| self.cache.get(id).ok())
    }

    /// Everyone except the current user and people who already got a card.
    #[must_use]
    pub fn available_to_send(
        &self,
        current: Option<EmployeeId>,
        sent_recipients: &HashSet<EmployeeId>,
    ) -> Vec<&Employee> {
        self.cache
            .all()
            .iter()
            .filter(|e| Some(e.id) != current && !sent_recipients.contains(&e.id))
            .collect()
    }
}

// --- Images ---

#[derive(Debug, Clone, Default)]
pub struct ValentineImageCollection {
    cache: IdCache<ValentineImage>,
}

impl ValentineImageCollection {
    pub fn load_all(&mut self, images: Vec<ValentineImage>) {
        self.cache.replace_all(images);
    }

    pub fn get_by_id(&self, id: ImageId) -> Result<&ValentineImage, CollectionError> {
        self.cache.get(id)
    }

    #[must_use]
    pub fn all(&self) -> &[ValentineImage] {
        self.cache.all()
    }

    pub fn add(&mut self, image: ValentineImage) {
        self.cache.insert(image);
    }

    pub fn upload_request(api: &ApiClient, file: &UploadFile) -> Result<HttpRequest, ApiError> {
        let owner = api.session().ok_or(ApiError::NotAuthenticated)?.user_id;
        api.upload_valentine_image(file, owner)
    }
}

// --- Sent valentines ---

#[derive(Debug, Clone, Default)]
pub struct MyValentineCollection {
    cache: IdCache<Valentine>,
}

impl MyValentineCollection {
    pub fn load_all(&mut self, valentines: Vec<Valentine>) {
        self.cache.replace_all(valentines);
    }

    pub fn get_by_id(&self, id: ValentineId) -> Result<&Valentine, CollectionError> {
        self.cache.get(id)
    }

    #[must_use]
    pub fn all(&self) -> &[Valentine] {
        self.cache.all()
    }

    #[must_use]
    pub fn recipient_ids(&self) -> HashSet<EmployeeId> {
        self.cache.all().iter().map(|v| v.recipient_id).collect()
    }

    pub fn create_request(api: &ApiClient, form: &FormState) -> Result<HttpRequest, crate::AppError> {
        let payload = form.to_create_request()?;
        Ok(api.create_valentine(&payload)?)
    }

    pub fn confirm_created(&mut self, valentine: Valentine) {
        self.cache.insert(valentine);
    }

    /// Absent ids fail here, before any request exists.
    pub fn delete_request(
        &self,
        api: &ApiClient,
        id: ValentineId,
    ) -> Result<HttpRequest, crate::AppError> {
        self.cache.get(id)?;
        Ok(api.delete_valentine(id)?)
    }

    pub fn confirm_deleted(&mut self, id: ValentineId) -> Result<Valentine, CollectionError> {
        self.cache.remove(id)
    }
}

// --- Received valentines ---

#[derive(Debug, Clone, Default)]
pub struct ReceivedValentineCollection {
    cache: IdCache<Valentine>,
    is_up_time: bool,
}

impl ReceivedValentineCollection {
    pub fn load_all(&mut self, received: ReceivedValentines) {
        self.is_up_time = received.is_up_time;
        self.cache.replace_all(received.valentines);
    }

    #[must_use]
    pub fn is_up_time(&self) -> bool {
        self.is_up_time
    }

    pub fn get_by_id(&self, id: ValentineId) -> Result<&Valentine, CollectionError> {
        self.cache.get(id)
    }

    #[must_use]
    pub fn all(&self) -> &[Valentine] {
        self.cache.all()
    }

    pub fn mark_read_request(
        &self,
        api: &ApiClient,
        id: ValentineId,
    ) -> Result<HttpRequest, crate::AppError> {
        self.cache.get(id)?;
        Ok(api.mark_valentine_read(id)?)
    }

    pub fn confirm_read(&mut self, id: ValentineId) -> Result<(), CollectionError> {
        self.cache.get_mut(id)?.is_read_by_recipient = true;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub employees: EmployeeCollection,
    pub images: ValentineImageCollection,
    pub my_valentines: MyValentineCollection,
    pub received: ReceivedValentineCollection,
}

impl Collections {
    /// Recipients the wizard must not offer: people who already hold a card from us. Read from
    /// the live sent collection, so a delete frees the recipient again.
    #[must_use]
    pub fn excluded_recipients(&self) -> HashSet<EmployeeId> {
        self.my_valentines.recipient_ids()
    }

    #[must_use]
    pub fn recipients_for(&self, current: Option<EmployeeId>) -> Vec<&Employee> {
        self.employees
            .available_to_send(current, &self.excluded_recipients())
    }
}
