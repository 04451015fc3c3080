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

/// Caches the value of a `#[reusable]` binding.
///
/// Unlike [`DoubleCheck`](crate::DoubleCheck) the provider may run more than once when it
/// re-enters itself; the first stored value wins.
#[doc(hidden)]
pub struct SingleCheck<T> {
    provider: Provider<T>,
    value: OnceCell<T>,
}

impl<T: Clone + 'static> SingleCheck<T> {
    pub fn new(provider: Provider<T>) -> Self {
        SingleCheck {
            provider,
            value: OnceCell::new(),
        }
    }

    pub fn provider(provider: Provider<T>) -> Provider<T> {
        let check = SingleCheck::new(provider);
        Provider::new(move || check.get())
    }

    pub fn get(&self) -> T {
        if let Some(value) = self.value.get() {
            return value.clone();
        }
        let value = self.provider.get();
        self.value.get_or_init(|| value).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn reuses_value() {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let provider = SingleCheck::provider(Provider::new(move || {
            c.set(c.get() + 1);
            c.get()
        }));
        assert_eq!(provider.get(), 1);
        assert_eq!(provider.get(), 1);
        assert_eq!(counter.get(), 1);
    }
}
