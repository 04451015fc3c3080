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

//! Helper structs that hold the providers of a binding's dependencies.

use crate::emit::expressions::{adapt_provider, call, ident, parameter_ident, receiver, ty, Context};
use crate::emit::plan::HelperPlan;
use crate::graph::ComponentId;
use crate::model::binding::BindingKind;
use crate::model::key::{DependencyRequest, RequestKind};
use crate::naming::{self, UniqueNames};
use anyhow::{bail, Context as _, Result};
use proc_macro2::{Ident, TokenStream};
use quote::quote;

/// Fields of a helper struct: one `Provider` per dependency request.
struct ProviderFields {
    names: Vec<Ident>,
    types: Vec<TokenStream>,
    /// The value each dependency request asks for, read from `self`.
    values: Vec<TokenStream>,
}

fn provider_fields(
    context: &Context,
    owner: ComponentId,
    requests: &[DependencyRequest],
    names: &mut UniqueNames,
) -> Result<ProviderFields> {
    let mut result = ProviderFields {
        names: Vec::new(),
        types: Vec::new(),
        values: Vec::new(),
    };
    for request in requests {
        let base = if request.name.is_empty() {
            "dependency".to_owned()
        } else {
            naming::snake_case(&request.name)
        };
        let field = ident(&names.allocate(&base));
        let produced = context.produced_type(owner, &request.key)?;
        let (_, dependency) = context.binding(owner, &request.key)?;
        let provider = if request.kind == RequestKind::Instance {
            quote! {self.#field}
        } else {
            quote! {self.#field.clone()}
        };
        result
            .values
            .push(adapt_provider(provider, dependency.is_nullable(), request)?);
        result.types.push(quote! {::dirk::Provider<#produced>});
        result.names.push(field);
    }
    Ok(result)
}

/// `X_Factory` for an `#[inject]` constructor or a `#[provides]` method.
pub fn factory(context: &Context, helper: &HelperPlan) -> Result<TokenStream> {
    let (_, binding) = context.binding(helper.owner, &helper.key)?;
    let name = ident(&helper.name);
    let mut names = UniqueNames::new();
    let mut field_names = Vec::new();
    let mut field_types = Vec::new();
    let mut module = None;
    if binding.requires_module_instance() {
        let module_type = binding
            .module
            .as_ref()
            .with_context(|| format!("{} has no module", binding.declaration))?;
        let t = ty(module_type)?;
        names.reserve("module");
        field_names.push(ident("module"));
        field_types.push(quote! {::std::sync::Arc<#t>});
        module = Some(quote! {self.module});
    }
    let dependencies = provider_fields(context, helper.owner, &binding.dependencies, &mut names)?;
    field_names.extend(dependencies.names);
    field_types.extend(dependencies.types);
    let value = call(binding, dependencies.values, module)?;
    let produced = context.produced_type(helper.owner, &helper.key)?;
    Ok(quote! {
        pub(crate) struct #name {
            #(#field_names: #field_types,)*
        }

        impl #name {
            pub(crate) fn new(#(#field_names: #field_types),*) -> Self {
                #name { #(#field_names),* }
            }
        }

        impl ::dirk::Factory<#produced> for #name {
            fn get(&self) -> #produced {
                #value
            }
        }
    })
}

/// Implementation of an `#[assisted_factory]` trait that passes the factory method arguments to
/// the `#[assisted]` constructor parameters and takes the rest from providers.
pub fn assisted_factory(context: &Context, helper: &HelperPlan) -> Result<TokenStream> {
    let (_, binding) = context.binding(helper.owner, &helper.key)?;
    let BindingKind::AssistedFactory {
        ref factory,
        ref target,
        ref constructor,
        ref parameters,
        ref constructor_parameters,
        ..
    } = binding.kind
    else {
        bail!("{} is not an assisted factory", binding.declaration);
    };
    let trait_method = context
        .decl
        .assisted_factory_method(factory)
        .with_context(|| format!("{} has no factory method", factory.readable()))?;
    let name = ident(&helper.name);
    let mut names = UniqueNames::new();
    let fields = provider_fields(context, helper.owner, &binding.dependencies, &mut names)?;

    let parameter_idents: Vec<Ident> = parameters
        .iter()
        .enumerate()
        .map(|(i, p)| parameter_ident(&p.name, i))
        .collect();
    let mut parameter_types = Vec::new();
    for parameter in parameters {
        parameter_types.push(ty(&parameter.type_data)?);
    }
    let mut used = vec![false; parameters.len()];
    let mut provided = fields.values.into_iter();
    let mut args = Vec::new();
    for constructor_parameter in constructor_parameters {
        let Some(ref id) = constructor_parameter.assisted else {
            args.push(provided.next().with_context(|| {
                format!("missing provider for {}", constructor_parameter.name)
            })?);
            continue;
        };
        // Parameters sharing a type and id are matched in declaration order.
        let index = parameters
            .iter()
            .enumerate()
            .position(|(i, p)| {
                !used[i]
                    && p.type_data == constructor_parameter.type_data
                    && p.assisted.clone().unwrap_or_default() == *id
            })
            .with_context(|| {
                format!(
                    "no factory parameter for #[assisted] {}",
                    constructor_parameter.name
                )
            })?;
        used[index] = true;
        let parameter = &parameter_idents[index];
        args.push(quote! {#parameter});
    }

    let trait_type = ty(&trait_method.declaring_trait)?;
    let method = ident(&trait_method.method.name);
    let method_receiver = receiver(trait_method.method.receiver);
    let target_type = ty(target)?;
    let target_path = crate::emit::expressions::type_path(target)?;
    let constructor = ident(constructor);
    let field_names = fields.names;
    let field_types = fields.types;
    let mut supertraits = Vec::new();
    for t in context.decl.trait_hierarchy(factory) {
        if t != trait_method.declaring_trait {
            let t = ty(&t)?;
            supertraits.push(quote! {impl #t for #name {}});
        }
    }
    Ok(quote! {
        pub(crate) struct #name {
            #(#field_names: #field_types,)*
        }

        impl #name {
            pub(crate) fn new(#(#field_names: #field_types),*) -> Self {
                #name { #(#field_names),* }
            }
        }

        impl #trait_type for #name {
            fn #method(#method_receiver #(#parameter_idents: #parameter_types),*) -> #target_type {
                #target_path::#constructor(#(#args),*)
            }
        }

        #(#supertraits)*
    })
}

