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

use crate::Provider;
use std::cell::OnceCell;

/// Caches the value of a scoped binding. The wrapped provider runs at most once; requesting the
/// binding again while it runs panics instead of creating a second instance.
///
/// Scoped values are handed out as clones, so scoped types are usually `Arc`s or cheap handles.
#[doc(hidden)]
pub struct DoubleCheck<T> {
    provider: Provider<T>,
    value: OnceCell<T>,
}

impl<T: Clone + 'static> DoubleCheck<T> {
    pub fn new(provider: Provider<T>) -> Self {
        DoubleCheck {
            provider,
            value: OnceCell::new(),
        }
    }

    /// Wraps `provider` so every call returns the first value it created.
    pub fn provider(provider: Provider<T>) -> Provider<T> {
        let check = DoubleCheck::new(provider);
        Provider::new(move || check.get())
    }

    pub fn get(&self) -> T {
        self.value.get_or_init(|| self.provider.get()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, OnceCell};
    use std::rc::Rc;

    #[test]
    fn creates_once() {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let provider = DoubleCheck::provider(Provider::new(move || {
            c.set(c.get() + 1);
            c.get()
        }));
        assert_eq!(provider.get(), 1);
        assert_eq!(provider.clone().get(), 1);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn not_created_before_get() {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let _provider = DoubleCheck::provider(Provider::new(move || c.set(c.get() + 1)));
        assert_eq!(counter.get(), 0);
    }

    #[test]
    #[should_panic]
    fn reentrant_creation_panics() {
        let slot: Rc<OnceCell<Provider<i32>>> = Rc::new(OnceCell::new());
        let s = slot.clone();
        let provider = DoubleCheck::provider(Provider::new(move || match s.get() {
            Some(provider) => provider.get() + 1,
            None => 0,
        }));
        let _ = slot.set(provider.clone());
        provider.get();
    }
}
