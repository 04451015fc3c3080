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

//! The coffee shop of `dirk_demo`, generated with the fast-init strategy. The tests of the
//! included source run against this crate's components.

include!("../../src/lib.rs");

#[cfg(test)]
mod fast_init_tests {
    #[test]
    fn components_dispatch_through_switching_provider() {
        let generated = include_str!(concat!(env!("OUT_DIR"), "/dirk_components_test.rs"));
        assert!(generated.contains("DirkCoffeeShopSwitchingProvider"), "{}", generated);
        assert!(!generated.contains("_Factory"), "{}", generated);
    }
}
