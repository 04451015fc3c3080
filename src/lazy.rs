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

/// Creates the value on the first [`get`](Lazy::get) and returns the same value afterwards.
///
/// Each `Lazy` holds its own value; for a value shared by the component, scope the binding.
pub struct Lazy<T> {
    provider: Provider<T>,
    value: OnceCell<T>,
}

impl<T> Lazy<T> {
    pub fn new(provider: Provider<T>) -> Self {
        Lazy {
            provider,
            value: OnceCell::new(),
        }
    }

    pub fn get(&self) -> &T {
        self.value.get_or_init(|| self.provider.get())
    }
}

/// Provides a new [`Lazy`] each time, for `Provider<Lazy<T>>` requests.
pub struct ProviderOfLazy;

impl ProviderOfLazy {
    pub fn create<T: 'static>(provider: Provider<T>) -> Provider<Lazy<T>> {
        Provider::new(move || Lazy::new(provider.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting() -> (Rc<Cell<i32>>, Provider<i32>) {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let provider = Provider::new(move || {
            c.set(c.get() + 1);
            c.get()
        });
        (counter, provider)
    }

    #[test]
    fn not_created_before_get() {
        let (counter, provider) = counting();
        let _lazy = Lazy::new(provider);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn multiple_get_same_instance() {
        let (counter, provider) = counting();
        let lazy = Lazy::new(provider);
        assert_eq!(*lazy.get(), 1);
        assert_eq!(*lazy.get(), 1);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn provider_of_lazy_creates_independent_lazies() {
        let (counter, provider) = counting();
        let lazies = ProviderOfLazy::create(provider);
        let first = lazies.get();
        let second = lazies.get();
        assert_eq!(counter.get(), 0);
        assert_eq!(*first.get(), 1);
        assert_eq!(*second.get(), 2);
        assert_eq!(*first.get(), 1);
    }
}
