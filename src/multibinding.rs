/*
Copyright 2026 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Providers assembling multibindings from the providers of their contributions.

use crate::{Factory, Provider};
use std::collections::HashMap;
use std::hash::Hash;

/// Collects `#[into_vec]` and `#[elements_into_vec]` contributions.
#[doc(hidden)]
pub struct VecFactory<T> {
    individual: Vec<Provider<T>>,
    collections: Vec<Provider<Vec<T>>>,
}

impl<T: 'static> VecFactory<T> {
    pub fn builder() -> VecFactoryBuilder<T> {
        VecFactoryBuilder {
            individual: Vec::new(),
            collections: Vec::new(),
        }
    }
}

impl<T> Factory<Vec<T>> for VecFactory<T> {
    fn get(&self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.individual.len());
        for provider in &self.individual {
            result.push(provider.get());
        }
        for provider in &self.collections {
            result.extend(provider.get());
        }
        result
    }
}

#[doc(hidden)]
pub struct VecFactoryBuilder<T> {
    individual: Vec<Provider<T>>,
    collections: Vec<Provider<Vec<T>>>,
}

impl<T: 'static> VecFactoryBuilder<T> {
    pub fn add(mut self, provider: Provider<T>) -> Self {
        self.individual.push(provider);
        self
    }

    pub fn add_all(mut self, provider: Provider<Vec<T>>) -> Self {
        self.collections.push(provider);
        self
    }

    pub fn build(self) -> Provider<Vec<T>> {
        Provider::from_factory(VecFactory {
            individual: self.individual,
            collections: self.collections,
        })
    }
}

/// Collects `#[into_map]` contributions.
#[doc(hidden)]
pub struct MapFactory<K, V> {
    contributions: Vec<(K, Provider<V>)>,
}

impl<K: Eq + Hash + Clone + 'static, V: 'static> MapFactory<K, V> {
    pub fn builder() -> MapFactoryBuilder<K, V> {
        MapFactoryBuilder {
            contributions: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Factory<HashMap<K, V>> for MapFactory<K, V> {
    fn get(&self) -> HashMap<K, V> {
        let mut result = HashMap::with_capacity(self.contributions.len());
        for (key, provider) in &self.contributions {
            result.insert(key.clone(), provider.get());
        }
        result
    }
}

#[doc(hidden)]
pub struct MapFactoryBuilder<K, V> {
    contributions: Vec<(K, Provider<V>)>,
}

impl<K: Eq + Hash + Clone + 'static, V: 'static> MapFactoryBuilder<K, V> {
    /// Later contributions replace earlier ones with the same key.
    pub fn put(mut self, key: K, provider: Provider<V>) -> Self {
        self.contributions.push((key, provider));
        self
    }

    pub fn build(self) -> Provider<HashMap<K, V>> {
        Provider::from_factory(MapFactory {
            contributions: self.contributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vec_collects_individual_then_collections() {
        let provider = VecFactory::builder()
            .add(Provider::new(|| 1))
            .add_all(Provider::new(|| vec![2, 3]))
            .add(Provider::new(|| 4))
            .build();
        assert_eq!(provider.get(), vec![1, 4, 2, 3]);
    }

    #[test]
    fn empty_vec() {
        let provider: Provider<Vec<i32>> = VecFactory::builder().build();
        assert!(provider.get().is_empty());
    }

    #[test]
    fn map_last_contribution_wins() {
        let provider = MapFactory::builder()
            .put("a".to_owned(), Provider::new(|| 1))
            .put("b".to_owned(), Provider::new(|| 2))
            .put("a".to_owned(), Provider::new(|| 3))
            .build();
        let map = provider.get();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 3);
        assert_eq!(map["b"], 2);
    }
}
