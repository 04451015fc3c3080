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
use std::rc::Rc;

/// A provider handed out before the provider it forwards to exists, for bindings that depend on
/// themselves through a `Provider` or `Lazy`.
#[doc(hidden)]
pub struct DelegateFactory<T> {
    delegate: Rc<OnceCell<Provider<T>>>,
}

impl<T: 'static> DelegateFactory<T> {
    pub fn new() -> Self {
        DelegateFactory {
            delegate: Rc::new(OnceCell::new()),
        }
    }

    pub fn provider(&self) -> Provider<T> {
        let delegate = self.delegate.clone();
        Provider::new(move || match delegate.get() {
            Some(provider) => provider.get(),
            None => panic!("dirk: provider requested before its delegate was set"),
        })
    }

    /// Sets the provider to forward to. Must be called exactly once.
    pub fn set(&self, provider: Provider<T>) {
        if self.delegate.set(provider).is_err() {
            panic!("dirk: delegate already set");
        }
    }
}

impl<T: 'static> Default for DelegateFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_after_set() {
        let delegate = DelegateFactory::<i32>::new();
        let provider = delegate.provider();
        delegate.set(Provider::new(|| 42));
        assert_eq!(provider.get(), 42);
    }

    #[test]
    #[should_panic(expected = "before its delegate was set")]
    fn panics_before_set() {
        let delegate = DelegateFactory::<i32>::new();
        delegate.provider().get();
    }

    #[test]
    #[should_panic(expected = "delegate already set")]
    fn set_twice_panics() {
        let delegate = DelegateFactory::<i32>::new();
        delegate.set(Provider::new(|| 1));
        delegate.set(Provider::new(|| 2));
    }
}
