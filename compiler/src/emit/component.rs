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

//! Component structs, their constructors, entry points and creators. The parts that differ
//! between strategies come from the [`Emitter`].

use crate::emit::expressions::{ident, parameter_ident, receiver, ty, Context, Site};
use crate::emit::Emitter;
use crate::graph::{ComponentId, EntryPointKind};
use crate::model::key::{self, DependencyRequest, ARC};
use anyhow::{Context as _, Result};
use dirk_common::manifest::{CreatorKind, Dependency, Method};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use tracing::debug;

/// The module holding everything generated for one root component, followed by a re-export of
/// the root struct.
pub fn root_module<E: Emitter + ?Sized>(emitter: &E, context: &Context) -> Result<TokenStream> {
    let module = ident(&context.plan.module_name);
    let root = context.component_ident(0);
    let mut items = quote! {};
    for id in context.graph.preorder() {
        debug!("emitting {}", context.graph.component(id).readable());
        items.extend(component_struct(context, id)?);
        items.extend(component_impl(emitter, context, id)?);
        items.extend(trait_impls(context, id)?);
        if context.graph.component(id).creator.is_some() {
            items.extend(user_creator(context, id)?);
        }
    }
    if context.graph.root().creator.is_none() {
        items.extend(generated_builder(context)?);
    }
    items.extend(emitter.support_items(context)?);
    Ok(quote! {
        #[allow(
            non_camel_case_types,
            non_snake_case,
            dead_code,
            unused_mut,
            unused_parens,
            unused_variables,
            clippy::all
        )]
        pub(crate) mod #module {
            #items
        }
        #[allow(unused_imports)]
        pub(crate) use #module::#root;
    })
}

/// A value the creator of a component can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Module(usize),
    Dependency(usize),
    Bound(usize),
}

/// One input of a component constructor, in parameter order.
struct Input {
    slot: Slot,
    field: Ident,
    /// Type of the constructor parameter and of the creator field.
    optional_type: TokenStream,
}

fn inputs(context: &Context, component: ComponentId) -> Result<Vec<Input>> {
    let plan = context.plan.component(component);
    let node = context.graph.component(component);
    let mut result = Vec::new();
    for (i, module) in plan.modules.iter().enumerate() {
        let t = ty(&module.type_data)?;
        result.push(Input {
            slot: Slot::Module(i),
            field: ident(&module.field),
            optional_type: quote! {::std::option::Option<::std::sync::Arc<#t>>},
        });
    }
    for (i, (dependency, field)) in plan.dependencies.iter().enumerate() {
        let t = ty(&key::arc_dyn(dependency))?;
        result.push(Input {
            slot: Slot::Dependency(i),
            field: ident(field),
            optional_type: quote! {::std::option::Option<#t>},
        });
    }
    for (i, bound) in node.bound_instances.iter().enumerate() {
        let t = ty(&bound.key.without_qualifier())?;
        result.push(Input {
            slot: Slot::Bound(i),
            field: ident(&bound.field),
            optional_type: quote! {::std::option::Option<#t>},
        });
    }
    Ok(result)
}

/// Where the value passed as `parameter` goes.
fn slot_for(context: &Context, component: ComponentId, parameter: &Dependency) -> Option<Slot> {
    let plan = context.plan.component(component);
    let node = context.graph.component(component);
    if parameter.bind_instance {
        let request = DependencyRequest::from_dependency(parameter);
        return node
            .bound_instances
            .iter()
            .position(|b| b.key == request.key)
            .map(Slot::Bound);
    }
    if let Some(dependency) = key::dyn_target(&parameter.type_data, ARC) {
        if let Some(i) = plan.dependencies.iter().position(|(d, _)| *d == dependency) {
            return Some(Slot::Dependency(i));
        }
    }
    plan.modules
        .iter()
        .position(|m| m.type_data == parameter.type_data)
        .map(Slot::Module)
}

/// Converts a creator argument to what the creator stores for `slot`.
fn slot_value(context: &Context, component: ComponentId, slot: Slot, value: TokenStream) -> TokenStream {
    match slot {
        Slot::Module(_) => quote! {::std::option::Option::Some(::std::sync::Arc::new(#value))},
        Slot::Dependency(_) => quote! {::std::option::Option::Some(#value)},
        Slot::Bound(i) => {
            if context.graph.component(component).bound_instances[i].nullable {
                value
            } else {
                quote! {::std::option::Option::Some(#value)}
            }
        }
    }
}

fn component_struct(context: &Context, component: ComponentId) -> Result<TokenStream> {
    let name = context.component_ident(component);
    let node = context.graph.component(component);
    let plan = context.plan.component(component);
    let mut fields = Vec::new();
    fields.push(quote! {this: ::std::sync::Weak<Self>});
    if let Some(parent) = node.parent {
        let parent = context.component_ident(parent);
        fields.push(quote! {parent: ::std::sync::Arc<#parent>});
    }
    for module in &plan.modules {
        let field = ident(&module.field);
        let t = ty(&module.type_data)?;
        fields.push(quote! {#field: ::std::sync::Arc<#t>});
    }
    for (dependency, field) in &plan.dependencies {
        let field = ident(field);
        let t = ty(&key::arc_dyn(dependency))?;
        fields.push(quote! {#field: #t});
    }
    for bound in &node.bound_instances {
        let field = ident(&bound.field);
        let t = ty(&bound.key.without_qualifier())?;
        fields.push(if bound.nullable {
            quote! {#field: ::std::option::Option<#t>}
        } else {
            quote! {#field: #t}
        });
    }
    for (key, field) in &plan.provider_fields {
        let field = ident(field);
        let produced = context.produced_type(component, key)?;
        fields.push(quote! {#field: ::dirk::Provider<#produced>});
    }
    Ok(quote! {
        pub(crate) struct #name {
            #(#fields,)*
        }
    })
}

/// `fn new(..) -> Arc<Self>`, resolving absent inputs before the fields are initialized.
fn component_impl<E: Emitter + ?Sized>(
    emitter: &E,
    context: &Context,
    component: ComponentId,
) -> Result<TokenStream> {
    let name = context.component_ident(component);
    let node = context.graph.component(component);
    let plan = context.plan.component(component);
    let inputs = inputs(context, component)?;

    let mut parameters = Vec::new();
    let mut field_names = vec![quote! {this: this.clone()}];
    if let Some(parent) = node.parent {
        let parent = context.component_ident(parent);
        parameters.push(quote! {parent: ::std::sync::Arc<#parent>});
        field_names.push(quote! {parent});
    }
    let mut resolutions = Vec::new();
    for input in &inputs {
        let field = &input.field;
        let optional_type = &input.optional_type;
        parameters.push(quote! {#field: #optional_type});
        field_names.push(quote! {#field});
        resolutions.push(match input.slot {
            Slot::Module(i) => {
                let module = &plan.modules[i];
                let t = ty(&module.type_data)?;
                let missing = if module.default_constructible {
                    quote! {::std::sync::Arc::new(<#t as ::std::default::Default>::default())}
                } else {
                    let message = format!("{} must be set", module.type_data.readable());
                    quote! {panic!(#message)}
                };
                quote! {
                    let #field = match #field {
                        ::std::option::Option::Some(value) => value,
                        ::std::option::Option::None => #missing,
                    };
                }
            }
            Slot::Dependency(i) => {
                let message = format!("{} must be set", plan.dependencies[i].0.readable());
                quote! {
                    let #field = match #field {
                        ::std::option::Option::Some(value) => value,
                        ::std::option::Option::None => panic!(#message),
                    };
                }
            }
            Slot::Bound(i) => {
                let bound = &node.bound_instances[i];
                if bound.nullable {
                    quote! {}
                } else {
                    let message = format!("{} must be set", bound.key.readable());
                    quote! {
                        let #field = match #field {
                            ::std::option::Option::Some(value) => value,
                            ::std::option::Option::None => panic!(#message),
                        };
                    }
                }
            }
        });
    }
    for (_, field) in &plan.provider_fields {
        let field = ident(field);
        field_names.push(quote! {#field});
    }
    let initializers = emitter.field_initializers(context, component)?;
    Ok(quote! {
        impl #name {
            pub(crate) fn new(#(#parameters),*) -> ::std::sync::Arc<Self> {
                #(#resolutions)*
                ::std::sync::Arc::new_cyclic(move |this: &::std::sync::Weak<Self>| {
                    #initializers
                    #name {
                        #(#field_names,)*
                    }
                })
            }
        }
    })
}

/// A factory method on the parent that builds `child` from the method parameters.
fn child_factory_method(
    context: &Context,
    parent: ComponentId,
    child: ComponentId,
    method: &Method,
) -> Result<TokenStream> {
    let name = ident(&method.name);
    let child_name = context.component_ident(child);
    let inputs = inputs(context, child)?;
    let mut args: Vec<TokenStream> = inputs.iter().map(|_| quote! {::std::option::Option::None}).collect();
    let mut parameters = Vec::new();
    let mut unused = Vec::new();
    for (i, parameter) in method.parameters.iter().enumerate() {
        let parameter_name = parameter_ident(&parameter.name, i);
        let t = ty(&parameter.type_data)?;
        parameters.push(quote! {#parameter_name: #t});
        match slot_for(context, child, parameter) {
            Some(slot) => {
                let position = inputs
                    .iter()
                    .position(|input| input.slot == slot)
                    .with_context(|| format!("no input for {}", parameter.name))?;
                args[position] = slot_value(context, child, slot, quote! {#parameter_name});
            }
            None => unused.push(quote! {let _ = #parameter_name;}),
        }
    }
    let return_type = match method.return_type {
        Some(ref t) => ty(t)?,
        None => quote! {()},
    };
    let parent_arc = weak_upgrade(context, parent);
    Ok(quote! {
        fn #name(&self, #(#parameters),*) -> #return_type {
            #(#unused)*
            #child_name::new(#parent_arc, #(#args),*)
        }
    })
}

fn weak_upgrade(context: &Context, component: ComponentId) -> TokenStream {
    let weak = context.weak(Site::method(component), component);
    quote! {::dirk::internal::upgrade(#weak)}
}

/// `impl Trait for X` for the component trait and each of its supertraits.
fn trait_impls(context: &Context, component: ComponentId) -> Result<TokenStream> {
    let name = context.component_ident(component);
    let node = context.graph.component(component);
    let mut result = quote! {};
    for declaring_trait in context.decl.trait_hierarchy(node.type_data()) {
        let mut methods = Vec::new();
        for entry_point in node
            .entry_points
            .iter()
            .filter(|e| e.declaring_trait == declaring_trait)
        {
            let method_name = ident(&entry_point.method.name);
            match entry_point.kind {
                EntryPointKind::Provision(ref request) => {
                    let return_type = match entry_point.method.return_type {
                        Some(ref t) => ty(t)?,
                        None => quote! {()},
                    };
                    let value = context.request(Site::method(component), component, request)?;
                    methods.push(quote! {
                        fn #method_name(&self) -> #return_type {
                            #value
                        }
                    });
                }
                EntryPointKind::ChildFactory { child } => {
                    methods.push(child_factory_method(
                        context,
                        component,
                        child,
                        &entry_point.method,
                    )?);
                }
            }
        }
        let t = ty(&declaring_trait)?;
        result.extend(quote! {
            impl #t for #name {
                #(#methods)*
            }
        });
    }
    Ok(result)
}

/// Implementation of a user-declared builder or factory trait. Creator methods store their
/// arguments; a method returning the component hands everything stored to `X::new`.
fn user_creator(context: &Context, component: ComponentId) -> Result<TokenStream> {
    let node = context.graph.component(component);
    let creator = node
        .creator
        .as_ref()
        .with_context(|| format!("{} has no creator", node.readable()))?;
    let name = context.component_ident(component);
    let creator_name = ident(&context.plan.component(component).creator_name());
    let inputs = inputs(context, component)?;
    let input_fields: Vec<&Ident> = inputs.iter().map(|i| &i.field).collect();
    let input_types: Vec<&TokenStream> = inputs.iter().map(|i| &i.optional_type).collect();

    let (parent_field, parent_parameter, parent_init, parent_arg) = match node.parent {
        Some(parent) => {
            let parent = context.component_ident(parent);
            (
                quote! {parent: ::std::sync::Arc<#parent>,},
                quote! {parent: ::std::sync::Arc<#parent>},
                quote! {parent,},
                quote! {creator.parent.clone(),},
            )
        }
        None => (quote! {}, quote! {}, quote! {}, quote! {}),
    };

    let mut impls = Vec::new();
    for creator_trait in context.decl.trait_hierarchy(&creator.type_data) {
        let mut methods = Vec::new();
        for trait_method in context
            .decl
            .abstract_methods(&creator.type_data)
            .into_iter()
            .filter(|m| m.declaring_trait == creator_trait)
        {
            let method = &trait_method.method;
            let method_name = ident(&method.name);
            let method_receiver = receiver(method.receiver);
            let mut parameters = Vec::new();
            let mut statements = Vec::new();
            for (i, parameter) in method.parameters.iter().enumerate() {
                let parameter_name = parameter_ident(&parameter.name, i);
                let t = ty(&parameter.type_data)?;
                parameters.push(quote! {#parameter_name: #t});
                match slot_for(context, component, parameter) {
                    Some(slot) => {
                        let field = &inputs
                            .iter()
                            .find(|input| input.slot == slot)
                            .with_context(|| format!("no input for {}", parameter.name))?
                            .field;
                        let value = slot_value(context, component, slot, quote! {#parameter_name});
                        statements.push(quote! {creator.#field = #value;});
                    }
                    None => statements.push(quote! {let _ = #parameter_name;}),
                }
            }
            let builds = method
                .return_type
                .as_ref()
                .and_then(|t| key::dyn_target(t, ARC))
                .map(|t| &t == node.type_data())
                .unwrap_or(false);
            if builds {
                let return_type = ty(method
                    .return_type
                    .as_ref()
                    .with_context(|| format!("{} returns nothing", method.name))?)?;
                methods.push(quote! {
                    fn #method_name(#method_receiver #(#parameters),*) -> #return_type {
                        let mut creator = self;
                        #(#statements)*
                        #name::new(#parent_arg #(creator.#input_fields.take()),*)
                    }
                });
            } else {
                methods.push(quote! {
                    fn #method_name(#method_receiver #(#parameters),*) {
                        let mut creator = self;
                        #(#statements)*
                    }
                });
            }
        }
        let t = ty(&creator_trait)?;
        impls.push(quote! {
            impl #t for #creator_name {
                #(#methods)*
            }
        });
    }

    let entry = if node.parent.is_none() {
        let creator_handle = ty(&key::box_dyn(&creator.type_data))?;
        let function = match creator.creator_kind {
            CreatorKind::Builder => ident("builder"),
            CreatorKind::Factory => ident("factory"),
        };
        quote! {
            impl #name {
                pub(crate) fn #function() -> #creator_handle {
                    ::std::boxed::Box::new(#creator_name::new())
                }
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        pub(crate) struct #creator_name {
            #parent_field
            #(#input_fields: #input_types,)*
        }

        impl #creator_name {
            pub(crate) fn new(#parent_parameter) -> Self {
                #creator_name {
                    #parent_init
                    #(#input_fields: ::std::option::Option::None,)*
                }
            }
        }

        #(#impls)*

        #entry
    })
}

/// `XBuilder` for a root component without a declared creator, with a setter per module and
/// component dependency. Setters of modules nothing reads are deprecated no-ops.
fn generated_builder(context: &Context) -> Result<TokenStream> {
    let plan = context.plan.component(0);
    let node = context.graph.root();
    let name = context.component_ident(0);
    let builder_name = ident(&plan.builder_name());
    let inputs = inputs(context, 0)?;
    let input_fields: Vec<&Ident> = inputs.iter().map(|i| &i.field).collect();
    let input_types: Vec<&TokenStream> = inputs.iter().map(|i| &i.optional_type).collect();

    let mut setters = Vec::new();
    for setter in &plan.setters {
        let setter_name = ident(&setter.name);
        let t = ty(&setter.type_data)?;
        if setter.used {
            setters.push(quote! {
                pub(crate) fn #setter_name(mut self, #setter_name: #t) -> Self {
                    self.#setter_name = ::std::option::Option::Some(::std::sync::Arc::new(#setter_name));
                    self
                }
            });
        } else {
            let note = format!(
                "{} is not used by {} and will be ignored",
                setter.type_data.readable(),
                node.readable()
            );
            setters.push(quote! {
                #[deprecated(note = #note)]
                pub(crate) fn #setter_name(self, #setter_name: #t) -> Self {
                    self
                }
            });
        }
    }
    for (dependency, field) in &plan.dependencies {
        let setter_name = ident(field);
        let t = ty(&key::arc_dyn(dependency))?;
        setters.push(quote! {
            pub(crate) fn #setter_name(mut self, #setter_name: #t) -> Self {
                self.#setter_name = ::std::option::Option::Some(#setter_name);
                self
            }
        });
    }

    let handle = ty(&key::arc_dyn(node.type_data()))?;
    let required = !plan.dependencies.is_empty()
        || plan.modules.iter().any(|m| !m.default_constructible);
    let create = if required {
        quote! {}
    } else {
        quote! {
            pub(crate) fn create() -> #handle {
                #name::builder().build()
            }
        }
    };
    Ok(quote! {
        pub(crate) struct #builder_name {
            #(#input_fields: #input_types,)*
        }

        impl #builder_name {
            #(#setters)*

            pub(crate) fn build(self) -> #handle {
                #name::new(#(self.#input_fields),*)
            }
        }

        impl #name {
            pub(crate) fn builder() -> #builder_name {
                #builder_name {
                    #(#input_fields: ::std::option::Option::None,)*
                }
            }

            #create
        }
    })
}
