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

use std::rc::Rc;

/// Creates a `T` each time [`get`](Provider::get) is called.
///
/// Inject `Provider<T>` instead of `T` to delay creation, create multiple instances, or break a
/// dependency cycle. Scoped bindings return the same instance from every call.
///
/// ```
/// # use dirk::Provider;
/// let provider = Provider::new(|| 42);
/// assert_eq!(provider.get(), 42);
/// ```
pub struct Provider<T> {
    f: Rc<dyn Fn() -> T>,
}

impl<T> Provider<T> {
    pub fn get(&self) -> T {
        (self.f)()
    }
}

impl<T: 'static> Provider<T> {
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Provider { f: Rc::new(f) }
    }

    pub fn from_factory<F: Factory<T> + 'static>(factory: F) -> Self {
        Provider::new(move || factory.get())
    }

    /// A provider that always returns a clone of `value`.
    pub fn instance(value: T) -> Self
    where
        T: Clone,
    {
        Provider::new(move || value.clone())
    }

    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Provider<U> {
        Provider::new(move || f(self.get()))
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Provider { f: self.f.clone() }
    }
}

/// Creates instances of a binding. Generated `*_Factory` types implement this.
pub trait Factory<T> {
    fn get(&self) -> T;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_calls_function_each_time() {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let provider = Provider::new(move || {
            c.set(c.get() + 1);
            c.get()
        });
        assert_eq!(provider.get(), 1);
        assert_eq!(provider.get(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn clones_share_function() {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let provider = Provider::new(move || c.set(c.get() + 1));
        let cloned = provider.clone();
        provider.get();
        cloned.get();
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn instance_returns_clones() {
        let provider = Provider::instance("foo".to_owned());
        assert_eq!(provider.get(), "foo");
        assert_eq!(provider.get(), "foo");
    }

    #[test]
    fn map_transforms_value() {
        let provider = Provider::new(|| 2).map(|i| i * 21);
        assert_eq!(provider.get(), 42);
    }

    struct Answer;

    impl Factory<i32> for Answer {
        fn get(&self) -> i32 {
            42
        }
    }

    #[test]
    fn from_factory() {
        assert_eq!(Provider::from_factory(Answer).get(), 42);
    }
}
