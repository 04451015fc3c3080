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

//! Helpers called by generated code. Not a stable API.

use std::any::Any;
use std::sync::{Arc, Weak};

/// Upgrades the back reference a provider holds to its component.
pub fn upgrade<C: ?Sized>(component: &Weak<C>) -> Arc<C> {
    match component.upgrade() {
        Some(component) => component,
        None => panic!("dirk: provider used after its component was dropped"),
    }
}

/// Unwraps the value of a `#[nullable]` binding requested as non-null.
pub fn non_null<T>(value: Option<T>, key: &str) -> T {
    match value {
        Some(value) => value,
        None => panic!("dirk: {} is #[nullable] and returned None", key),
    }
}

/// Recovers the value returned through a switching provider.
pub fn downcast<T: 'static>(value: Box<dyn Any>) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => panic!(
            "dirk: switching provider returned a value that is not {}",
            std::any::type_name::<T>()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_live_component() {
        let component = Arc::new(1);
        assert_eq!(*upgrade(&Arc::downgrade(&component)), 1);
    }

    #[test]
    #[should_panic(expected = "after its component was dropped")]
    fn upgrade_dropped_component() {
        let weak = Arc::downgrade(&Arc::new(1));
        upgrade(&weak);
    }

    #[test]
    #[should_panic(expected = "crate::Foo is #[nullable] and returned None")]
    fn non_null_none() {
        non_null::<i32>(None, "crate::Foo");
    }

    #[test]
    fn downcast_matching_type() {
        let value: Box<dyn Any> = Box::new("foo".to_owned());
        assert_eq!(downcast::<String>(value), "foo");
    }

    #[test]
    #[should_panic(expected = "is not")]
    fn downcast_wrong_type() {
        let value: Box<dyn Any> = Box::new(1i32);
        downcast::<String>(value);
    }
}
