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

use dirk::{component, injectable, module, scope, Lazy};
use std::cell::Cell;
use std::sync::Arc;

#[scope]
pub struct Singleton;

pub trait Heater {
    fn on(&self);
    fn off(&self);
    fn is_hot(&self) -> bool;
}

pub trait Pump {
    fn pump(&self) -> bool;
}

pub struct ElectricHeater {
    heating: Cell<bool>,
}

#[injectable]
impl ElectricHeater {
    #[inject]
    pub fn new() -> Self {
        ElectricHeater {
            heating: Cell::new(false),
        }
    }
}

impl Heater for ElectricHeater {
    fn on(&self) {
        self.heating.set(true);
    }

    fn off(&self) {
        self.heating.set(false);
    }

    fn is_hot(&self) -> bool {
        self.heating.get()
    }
}

pub struct Thermosiphon {
    heater: Arc<dyn Heater>,
}

#[injectable]
impl Thermosiphon {
    #[inject]
    pub fn new(heater: Arc<dyn crate::Heater>) -> Self {
        Thermosiphon { heater }
    }
}

impl Pump for Thermosiphon {
    fn pump(&self) -> bool {
        self.heater.is_hot()
    }
}

pub struct DripCoffeeModule;

#[module]
impl DripCoffeeModule {
    #[provides]
    #[scoped(crate::Singleton)]
    pub fn provide_heater(heater: crate::ElectricHeater) -> Arc<dyn crate::Heater> {
        Arc::new(heater)
    }

    #[binds]
    pub fn bind_pump(pump: crate::Thermosiphon) -> Box<dyn crate::Pump> {}

    #[provides]
    #[into_vec]
    pub fn drip() -> String {
        "drip".to_owned()
    }

    #[provides]
    #[into_vec]
    pub fn pour_over() -> String {
        "pour over".to_owned()
    }
}

pub struct CoffeeMaker {
    heater: Lazy<Arc<dyn Heater>>,
    pump: Box<dyn Pump>,
}

#[injectable]
impl CoffeeMaker {
    #[inject]
    pub fn new(heater: Lazy<Arc<dyn crate::Heater>>, pump: Box<dyn crate::Pump>) -> Self {
        CoffeeMaker { heater, pump }
    }

    /// Returns whether anything was brewed.
    pub fn brew(&self) -> bool {
        self.heater.get().on();
        let brewed = self.pump.pump();
        self.heater.get().off();
        brewed
    }
}

#[component(modules: [crate::DripCoffeeModule])]
#[scoped(crate::Singleton)]
pub trait CoffeeShop {
    fn maker(&self) -> crate::CoffeeMaker;
    fn heater(&self) -> Arc<dyn crate::Heater>;
    fn menu(&self) -> Vec<String>;
}

dirk::include_components!();

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maker_brews_with_the_shared_heater() {
        let shop = DirkCoffeeShop::create();
        let maker = shop.maker();
        assert!(maker.brew());
        assert!(!shop.heater().is_hot());
    }

    #[test]
    fn heater_is_scoped_to_the_component() {
        let shop = DirkCoffeeShop::create();
        assert!(Arc::ptr_eq(&shop.heater(), &shop.heater()));

        let other = DirkCoffeeShop::create();
        assert!(!Arc::ptr_eq(&shop.heater(), &other.heater()));
    }

    #[test]
    fn menu_collects_contributions() {
        let shop = DirkCoffeeShop::create();
        let mut menu = shop.menu();
        menu.sort();
        assert_eq!(menu, vec!["drip".to_owned(), "pour over".to_owned()]);
    }
}
