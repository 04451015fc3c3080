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

//! Fast-init strategy: one switching provider per component dispatches on an integer id, so only
//! scoped keys need a field and no per-binding struct is generated.

use crate::emit::expressions::{ident, Context, Site};
use crate::emit::factories;
use crate::emit::plan::BANK_SIZE;
use crate::emit::Emitter;
use crate::graph::ComponentId;
use crate::model::binding::Scope;
use crate::options::CodegenMode;
use anyhow::{Context as _, Result};
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

pub struct FastInitEmitter;

impl Emitter for FastInitEmitter {
    fn mode(&self) -> CodegenMode {
        CodegenMode::FastInit
    }

    fn field_initializers(&self, context: &Context, component: ComponentId) -> Result<TokenStream> {
        let plan = context.plan.component(component);
        let switching = ident(&plan.switching_provider_name());
        let mut result = quote! {};
        for (key, field) in &plan.provider_fields {
            let (_, binding) = context.binding(component, key)?;
            let id = plan
                .switch_id(key)
                .map(Literal::usize_unsuffixed)
                .with_context(|| format!("no switch case for {}", key.readable()))?;
            let produced = context.produced_type(component, key)?;
            let provider = quote! {#switching::provider(this, #id)};
            let value = match binding.scope {
                Some(Scope::Named(_)) => quote! {::dirk::DoubleCheck::provider(#provider)},
                Some(Scope::Reusable) => quote! {::dirk::SingleCheck::provider(#provider)},
                None => provider,
            };
            let field = ident(field);
            result.extend(quote! {let #field: ::dirk::Provider<#produced> = #value;});
        }
        Ok(result)
    }

    fn support_items(&self, context: &Context) -> Result<TokenStream> {
        let mut result = quote! {};
        for component in context.graph.preorder() {
            if !context.plan.component(component).switch_ids.is_empty() {
                result.extend(switching_provider(context, component)?);
            }
        }
        for helper in &context.plan.assisted_factories {
            result.extend(factories::assisted_factory(context, helper)?);
        }
        Ok(result)
    }
}

/// `XSwitchingProvider`: a `Provider` source for every switch case of `component`, split into
/// banks of at most [`BANK_SIZE`] cases.
fn switching_provider(context: &Context, component: ComponentId) -> Result<TokenStream> {
    let plan = context.plan.component(component);
    let name = ident(&plan.switching_provider_name());
    let component_type = context.component_ident(component);

    let mut banks = Vec::new();
    let mut dispatch = Vec::new();
    for (bank, cases) in plan.switch_ids.chunks(BANK_SIZE).enumerate() {
        let bank_method = format_ident!("get{}", bank);
        let bank_index = Literal::usize_unsuffixed(bank);
        let mut arms = Vec::new();
        for (key, id) in cases {
            let id = Literal::usize_unsuffixed(*id);
            let value = context.construct(Site::bank(component), component, key)?;
            arms.push(quote! {#id => ::std::boxed::Box::new(#value),});
        }
        dispatch.push(quote! {#bank_index => self.#bank_method(&component),});
        banks.push(quote! {
            fn #bank_method(&self, component: &#component_type) -> ::std::boxed::Box<dyn ::std::any::Any> {
                match self.id {
                    #(#arms)*
                    _ => unreachable!(),
                }
            }
        });
    }
    let bank_size = Literal::usize_unsuffixed(BANK_SIZE);
    Ok(quote! {
        pub(crate) struct #name {
            component: ::std::sync::Weak<#component_type>,
            id: usize,
        }

        impl #name {
            pub(crate) fn provider<T: 'static>(
                component: &::std::sync::Weak<#component_type>,
                id: usize,
            ) -> ::dirk::Provider<T> {
                let switching = #name {
                    component: component.clone(),
                    id,
                };
                ::dirk::Provider::new(move || switching.get::<T>())
            }

            fn get<T: 'static>(&self) -> T {
                let component = ::dirk::internal::upgrade(&self.component);
                let value = match self.id / #bank_size {
                    #(#dispatch)*
                    _ => unreachable!(),
                };
                ::dirk::internal::downcast(value)
            }

            #(#banks)*
        }
    })
}
