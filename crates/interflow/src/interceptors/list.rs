use std::sync::Arc;

use super::imply_content_type::ImplyContentType;
use super::InterceptorObject;

pub struct InterceptorList {
    entries: Vec<InterceptorObject>,
}

impl InterceptorList {
    pub fn new() -> Self {
        Self {
            entries: vec![Arc::new(ImplyContentType::new())],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&InterceptorObject> {
        self.entries.get(index)
    }

    pub fn set(&mut self, index: usize, interceptor: InterceptorObject) {
        self.entries[index] = interceptor;
    }

    pub fn insert(&mut self, index: usize, interceptor: InterceptorObject) {
        self.entries.insert(index, interceptor);
    }

    pub fn push(&mut self, interceptor: InterceptorObject) {
        self.entries.push(interceptor);
    }

    pub fn remove(&mut self, index: usize) -> InterceptorObject {
        self.entries.remove(index)
    }

    pub fn remove_entry(&mut self, entry: &InterceptorObject) -> bool {
        let before = self.entries.len();
        self.entries.retain(|candidate| !Arc::ptr_eq(candidate, entry));
        self.entries.len() != before
    }

    pub fn retain(&mut self, keep: impl FnMut(&InterceptorObject) -> bool) {
        self.entries.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterceptorObject> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.entries.push(Arc::new(ImplyContentType::new()));
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn remove_imply_content_type(&mut self) {
        self.entries.retain(|entry| {
            entry
                .as_any()
                .downcast_ref::<ImplyContentType>()
                .is_none()
        });
    }

    pub(crate) fn snapshot(&self) -> Vec<InterceptorObject> {
        self.entries.clone()
    }
}

impl Default for InterceptorList {
    fn default() -> Self {
        Self::new()
    }
}
