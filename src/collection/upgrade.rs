//! Lazy promotion of fixed backing storage to mutable storage.
//!
//! Hosts hand the engine read-optimized, fixed collections. Structural
//! modifiers need growable ones. `ensure_mutable` performs the promotion at
//! most once: the first call copies (or reclaims, when the fixed storage is
//! uniquely held) the contents into a growable implementation, every later
//! call returns the same storage untouched.

use ahash::AHashMap;
use std::hash::Hash;
use std::sync::Arc;

/// An ordered list that starts out fixed-capacity and can be promoted to a
/// growable `Vec` exactly once.
#[derive(Clone, Debug)]
pub enum UpgradableList<T> {
    Fixed(Arc<[T]>),
    Mutable(Vec<T>),
}

impl<T: Clone> UpgradableList<T> {
    pub fn fixed(items: Vec<T>) -> Self {
        Self::Fixed(items.into())
    }

    pub fn mutable(items: Vec<T>) -> Self {
        Self::Mutable(items)
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Fixed(items) => items,
            Self::Mutable(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Mutable(_))
    }

    /// Returns mutable growable storage, promoting on first call. Calling
    /// this redundantly is a no-op: the second call neither reallocates nor
    /// loses elements.
    pub fn ensure_mutable(&mut self) -> &mut Vec<T> {
        if let Self::Fixed(items) = self {
            let vec = match Arc::get_mut(items) {
                Some(slice) => slice.to_vec(),
                None => items.to_vec(),
            };
            *self = Self::Mutable(vec);
        }
        match self {
            Self::Mutable(items) => items,
            Self::Fixed(_) => unreachable!("promoted above"),
        }
    }
}

impl<T: Clone> FromIterator<T> for UpgradableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Fixed(iter.into_iter().collect())
    }
}

/// A hash map that starts out fixed and can be promoted to a growable
/// `AHashMap` exactly once. Same contract as [`UpgradableList`].
#[derive(Clone, Debug)]
pub enum UpgradableMap<K, V> {
    Fixed(Arc<AHashMap<K, V>>),
    Mutable(AHashMap<K, V>),
}

impl<K: Eq + Hash + Clone, V: Clone> UpgradableMap<K, V> {
    pub fn fixed(map: AHashMap<K, V>) -> Self {
        Self::Fixed(Arc::new(map))
    }

    pub fn mutable(map: AHashMap<K, V>) -> Self {
        Self::Mutable(map)
    }

    pub fn as_map(&self) -> &AHashMap<K, V> {
        match self {
            Self::Fixed(map) => map,
            Self::Mutable(map) => map,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.as_map().get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.as_map().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.as_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_map().is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.as_map().iter()
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Mutable(_))
    }

    /// Returns mutable growable storage, promoting on first call; redundant
    /// calls return the existing storage untouched.
    pub fn ensure_mutable(&mut self) -> &mut AHashMap<K, V> {
        if let Self::Fixed(map) = self {
            let owned = match Arc::get_mut(map) {
                Some(inner) => std::mem::take(inner),
                None => map.as_ref().clone(),
            };
            *self = Self::Mutable(owned);
        }
        match self {
            Self::Mutable(map) => map,
            Self::Fixed(_) => unreachable!("promoted above"),
        }
    }
}
