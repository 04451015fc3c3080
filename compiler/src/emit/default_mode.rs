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

//! Default strategy: every key that needs a provider gets a `Provider` field, built from a
//! dedicated `*_Factory` struct when the binding calls user code.

use crate::emit::expressions::{adapt_provider, call, ident, map_key, Context, Site};
use crate::emit::factories;
use crate::emit::Emitter;
use crate::graph::ComponentId;
use crate::model::binding::{Binding, BindingKind, Scope};
use crate::model::key::{Key, RequestKind};
use crate::options::CodegenMode;
use anyhow::Result;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::{BTreeMap, BTreeSet};

pub struct DefaultEmitter;

impl Emitter for DefaultEmitter {
    fn mode(&self) -> CodegenMode {
        CodegenMode::Default
    }

    fn field_initializers(&self, context: &Context, component: ComponentId) -> Result<TokenStream> {
        let mut initializers = Initializers {
            context,
            component,
            state: BTreeMap::new(),
            delegated: BTreeSet::new(),
            prelude: Vec::new(),
            statements: Vec::new(),
        };
        for (key, _) in &context.plan.component(component).provider_fields {
            initializers.visit(key)?;
        }
        let prelude = initializers.prelude;
        let statements = initializers.statements;
        Ok(quote! {
            #(#prelude)*
            #(#statements)*
        })
    }

    fn support_items(&self, context: &Context) -> Result<TokenStream> {
        let mut result = quote! {};
        for helper in &context.plan.factories {
            result.extend(factories::factory(context, helper)?);
        }
        for helper in &context.plan.assisted_factories {
            result.extend(factories::assisted_factory(context, helper)?);
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Visiting,
    Done,
}

/// Orders provider fields so that each is initialized after the providers it reads. A provider
/// reached again while its own dependencies are being initialized is declared up front through a
/// `DelegateFactory` and set once its real provider exists.
struct Initializers<'a, 'b> {
    context: &'b Context<'a>,
    component: ComponentId,
    state: BTreeMap<Key, State>,
    delegated: BTreeSet<Key>,
    prelude: Vec<TokenStream>,
    statements: Vec<TokenStream>,
}

impl<'a, 'b> Initializers<'a, 'b> {
    fn field(&self, key: &Key) -> Option<&'b str> {
        self.context.plan.component(self.component).provider_field(key)
    }

    fn visit(&mut self, key: &Key) -> Result<()> {
        match self.state.get(key) {
            Some(State::Done) => return Ok(()),
            Some(State::Visiting) => {
                self.delegate(key)?;
                return Ok(());
            }
            None => {}
        }
        self.state.insert(key.clone(), State::Visiting);
        let (_, binding) = self.context.binding(self.component, key)?;
        for request in &binding.dependencies {
            let resolved = self.context.resolved(self.component, &request.key)?;
            if resolved.owner == self.component && self.field(&request.key).is_some() {
                self.visit(&request.key)?;
            }
        }
        let Some(field) = self.field(key) else {
            return Ok(());
        };
        let field = ident(field);
        let value = scoped(binding, provider(self.context, self.component, binding)?);
        if self.delegated.contains(key) {
            let delegate = format_ident!("{}_delegate", field);
            self.statements.push(quote! {#delegate.set(#value);});
        } else {
            let produced = self.context.produced_type(self.component, key)?;
            self.statements
                .push(quote! {let #field: ::dirk::Provider<#produced> = #value;});
        }
        self.state.insert(key.clone(), State::Done);
        Ok(())
    }

    fn delegate(&mut self, key: &Key) -> Result<()> {
        if !self.delegated.insert(key.clone()) {
            return Ok(());
        }
        let Some(field) = self.field(key) else {
            return Ok(());
        };
        let field = ident(field);
        let delegate = format_ident!("{}_delegate", field);
        let produced = self.context.produced_type(self.component, key)?;
        self.prelude.push(quote! {
            let #delegate = ::dirk::DelegateFactory::<#produced>::new();
            let #field: ::dirk::Provider<#produced> = #delegate.provider();
        });
        Ok(())
    }
}

fn scoped(binding: &Binding, provider: TokenStream) -> TokenStream {
    match binding.scope {
        Some(Scope::Named(_)) => quote! {::dirk::DoubleCheck::provider(#provider)},
        Some(Scope::Reusable) => quote! {::dirk::SingleCheck::provider(#provider)},
        None => provider,
    }
}

/// Unscoped provider of `binding`, inside the constructor of `component`.
fn provider(context: &Context, component: ComponentId, binding: &Binding) -> Result<TokenStream> {
    let site = Site::constructor(component);
    Ok(match binding.kind {
        BindingKind::Injection { .. } | BindingKind::Provision { .. } => {
            let factory = context.new_factory(site, component, binding)?;
            quote! {::dirk::Provider::from_factory(#factory)}
        }
        BindingKind::MultiboundVec { ref contributions } => {
            let mut calls = Vec::new();
            for (contribution, collection) in contributions {
                let p = context.provider(site, component, contribution)?;
                calls.push(if *collection {
                    quote! {.add_all(#p)}
                } else {
                    quote! {.add(#p)}
                });
            }
            quote! {::dirk::VecFactory::builder() #(#calls)* .build()}
        }
        BindingKind::MultiboundMap {
            ref contributions, ..
        } => {
            let mut calls = Vec::new();
            for (map_key_value, contribution) in contributions {
                let key = map_key(map_key_value)?;
                let p = context.provider(site, component, contribution)?;
                calls.push(quote! {.put(#key, #p)});
            }
            quote! {::dirk::MapFactory::builder() #(#calls)* .build()}
        }
        BindingKind::Delegate { .. }
        | BindingKind::Optional { .. }
        | BindingKind::ComponentDependencyMethod { .. } => mapped(context, component, binding)?,
        BindingKind::ComponentInstance { .. } | BindingKind::SubcomponentCreator { .. } => {
            let value = context.construct(Site::bank(component), component, &binding.key)?;
            quote! {{
                let component = this.clone();
                ::dirk::Provider::new(move || {
                    let component = ::dirk::internal::upgrade(&component);
                    #value
                })
            }}
        }
        BindingKind::ComponentDependency { .. }
        | BindingKind::BoundInstance { .. }
        | BindingKind::AssistedFactory { .. } => {
            let value = context.construct(site, component, &binding.key)?;
            quote! {::dirk::Provider::instance(#value)}
        }
    })
}

/// A provider that computes the binding from the providers of its dependencies.
fn mapped(context: &Context, component: ComponentId, binding: &Binding) -> Result<TokenStream> {
    let site = Site::constructor(component);
    let mut captures = Vec::new();
    let mut args = Vec::new();
    for (i, request) in binding.dependencies.iter().enumerate() {
        let name = format_ident!("dependency{}", i);
        let p = context.provider(site, component, &request.key)?;
        captures.push(quote! {let #name = #p;});
        let (_, dependency) = context.binding(component, &request.key)?;
        let captured = if request.kind == RequestKind::Instance {
            quote! {#name}
        } else {
            quote! {#name.clone()}
        };
        args.push(adapt_provider(captured, dependency.is_nullable(), request)?);
    }
    let value = call(binding, args, None)?;
    Ok(quote! {{
        #(#captures)*
        ::dirk::Provider::new(move || #value)
    }})
}
