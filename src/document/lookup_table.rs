//! Bounded bijective interning tables for styles and objects

use crate::document::{ObjectRef, Style};
use crate::error::{LayoutError, Result};
use rustc_hash::FxHashMap;
use std::hash::Hash;

/// A value that can be interned; equal keys share one index
pub trait Interned: Clone {
    type Key: Eq + Hash;

    fn intern_key(&self) -> Self::Key;
}

impl Interned for Style {
    type Key = Style;

    fn intern_key(&self) -> Style {
        self.clone()
    }
}

impl Interned for ObjectRef {
    type Key = usize;

    fn intern_key(&self) -> usize {
        self.identity()
    }
}

/// Maps values to dense indices `0..max`
#[derive(Debug)]
pub struct LookupTable<T: Interned> {
    values: Vec<T>,
    indices: FxHashMap<T::Key, usize>,
    max: usize,
    overflow: fn(usize) -> LayoutError,
}

impl<T: Interned> LookupTable<T> {
    pub fn new(max: usize, overflow: fn(usize) -> LayoutError) -> Self {
        Self {
            values: Vec::new(),
            indices: FxHashMap::default(),
            max,
            overflow,
        }
    }

    /// Index of `value`, interning it if it is new.
    ///
    /// Fails without modifying the table once `max` entries exist.
    pub fn assign_index(&mut self, value: &T) -> Result<usize> {
        let key = value.intern_key();
        if let Some(&index) = self.indices.get(&key) {
            return Ok(index);
        }
        if self.values.len() >= self.max {
            return Err((self.overflow)(self.max));
        }
        let index = self.values.len();
        self.values.push(value.clone());
        self.indices.insert(key, index);
        Ok(index)
    }

    /// Fails if `assign_index(value)` would overflow, without interning
    pub fn check_room(&self, value: &T) -> Result<()> {
        if self.values.len() >= self.max && !self.indices.contains_key(&value.intern_key()) {
            return Err((self.overflow)(self.max));
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.indices.clear();
    }
}

impl LookupTable<Style> {
    pub fn for_styles(max: usize) -> Self {
        Self::new(max, |max| LayoutError::TooManyStyles { max })
    }
}

impl LookupTable<ObjectRef> {
    pub fn for_objects(max: usize) -> Self {
        Self::new(max, |max| LayoutError::TooManyObjects { max })
    }
}
