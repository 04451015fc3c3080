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

use crate::emit::plan::Plan;
use crate::graph::{BindingGraph, ChildSource, ComponentId, ResolvedBindings};
use crate::model::binding::{Binding, BindingKind};
use crate::model::declarations::Declarations;
use crate::model::key::{self, DependencyRequest, Key, RequestKind};
use anyhow::{bail, Context as _, Result};
use dirk_common::manifest::{MultibindingMapKey, Receiver};
use dirk_common::type_data::TypeData;
use proc_macro2::{Ident, Literal, TokenStream};
use quote::{format_ident, quote};

/// How generated code reaches the component it runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// A method of the component struct; the component is `self`.
    Method,
    /// A dispatch bank of a switching provider; the component is `component`.
    Bank,
    /// The closure passed to `Arc::new_cyclic`. Fields of the component under construction are
    /// local variables, `this` is its `&Weak<Self>` and ancestors hang off `parent`.
    Constructor,
}

#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub component: ComponentId,
    pub kind: SiteKind,
}

impl Site {
    pub fn method(component: ComponentId) -> Site {
        Site {
            component,
            kind: SiteKind::Method,
        }
    }

    pub fn bank(component: ComponentId) -> Site {
        Site {
            component,
            kind: SiteKind::Bank,
        }
    }

    pub fn constructor(component: ComponentId) -> Site {
        Site {
            component,
            kind: SiteKind::Constructor,
        }
    }
}

pub fn ident(name: &str) -> Ident {
    format_ident!("{}", name)
}

pub fn ty(type_data: &TypeData) -> Result<TokenStream> {
    let syn_type = type_data.syn_type()?;
    Ok(quote! {#syn_type})
}

/// The type in expression position: `crate::Foo` or `<crate::Foo<i32>>`.
pub fn type_path(type_data: &TypeData) -> Result<TokenStream> {
    if type_data.args.is_empty() && !type_data.trait_object && !type_data.is_primitive() {
        let path: syn::Path = syn::parse_str(&type_data.canonical_string_path())
            .with_context(|| format!("unable to render path {}", type_data.readable()))?;
        return Ok(quote! {#path});
    }
    let t = ty(type_data)?;
    Ok(quote! {<#t>})
}

pub fn receiver(receiver: Receiver) -> TokenStream {
    match receiver {
        Receiver::None => quote! {},
        Receiver::Ref => quote! {&self,},
        Receiver::RefMut => quote! {&mut self,},
        Receiver::Value => quote! {self,},
        Receiver::Boxed => quote! {self: ::std::boxed::Box<Self>,},
    }
}

/// Identifier for the `index`th parameter named `name` in user code.
pub fn parameter_ident(name: &str, index: usize) -> Ident {
    if name.is_empty() || name == "_" || name.starts_with(|c: char| !c.is_alphabetic() && c != '_') {
        format_ident!("arg{}", index)
    } else {
        ident(name)
    }
}

pub fn map_key(map_key: &MultibindingMapKey) -> Result<TokenStream> {
    Ok(match map_key {
        MultibindingMapKey::String(value) => quote! {::std::string::String::from(#value)},
        MultibindingMapKey::I32(value) => {
            let literal = Literal::i32_unsuffixed(*value);
            quote! {#literal}
        }
        MultibindingMapKey::Enum(_, value) => {
            let path: syn::Path = syn::parse_str(&value.canonical_string_path())
                .with_context(|| format!("unable to render map key {}", value.readable()))?;
            quote! {#path}
        }
        MultibindingMapKey::None => bail!("map contribution without a key"),
    })
}

/// Turns a value of the bound type into the value a nullable or non-null request expects.
fn adapt_nullable(value: TokenStream, binding_nullable: bool, request: &DependencyRequest) -> TokenStream {
    match (binding_nullable, request.nullable) {
        (true, false) => {
            let readable = request.key.readable();
            quote! {::dirk::internal::non_null(#value, #readable)}
        }
        (false, true) => quote! {::std::option::Option::Some(#value)},
        _ => value,
    }
}

/// The value `request` asks for, given an owned `Provider` of the bound type.
pub fn adapt_provider(
    provider: TokenStream,
    binding_nullable: bool,
    request: &DependencyRequest,
) -> Result<TokenStream> {
    let provider = if binding_nullable && request.kind != RequestKind::Instance {
        let readable = request.key.readable();
        quote! {#provider.map(|value| ::dirk::internal::non_null(value, #readable))}
    } else {
        provider
    };
    Ok(match request.kind {
        RequestKind::Instance => adapt_nullable(quote! {#provider.get()}, binding_nullable, request),
        RequestKind::Provider => provider,
        RequestKind::Lazy => quote! {::dirk::Lazy::new(#provider)},
        RequestKind::ProviderOfLazy => quote! {::dirk::ProviderOfLazy::create(#provider)},
        RequestKind::Producer => bail!(
            "Producer requests cannot be generated: {}",
            request.requested_type.readable()
        ),
    })
}

/// Value of a binding computed from the values of its dependencies, for bindings that do not
/// need the component.
///
/// `module` is the module instance for provision methods called on `&self`.
pub fn call(binding: &Binding, args: Vec<TokenStream>, module: Option<TokenStream>) -> Result<TokenStream> {
    Ok(match binding.kind {
        BindingKind::Injection {
            ref type_data,
            ref constructor,
        } => {
            let path = type_path(type_data)?;
            let constructor = ident(constructor);
            quote! {#path::#constructor(#(#args),*)}
        }
        BindingKind::Provision {
            module: ref module_type,
            ref method,
            is_static,
            ..
        } => {
            let method = ident(method);
            if is_static {
                let path = type_path(module_type)?;
                quote! {#path::#method(#(#args),*)}
            } else {
                let module = module.with_context(|| {
                    format!("no module instance for {}", binding.declaration)
                })?;
                quote! {#module.#method(#(#args),*)}
            }
        }
        BindingKind::Delegate {
            module: ref module_type,
            ref method,
        } => {
            let path = type_path(module_type)?;
            let method = ident(method);
            quote! {#path::#method(#(#args),*)}
        }
        BindingKind::Optional { .. } => match args.into_iter().next() {
            Some(value) => quote! {::std::option::Option::Some(#value)},
            None => {
                let t = ty(&binding.key)?;
                quote! {<#t>::None}
            }
        },
        BindingKind::MultiboundVec { ref contributions } => {
            let t = ty(&binding.key)?;
            let mut statements = Vec::new();
            for ((_, collection), value) in contributions.iter().zip(args) {
                statements.push(if *collection {
                    quote! {elements.extend(#value);}
                } else {
                    quote! {elements.push(#value);}
                });
            }
            quote! {{
                let mut elements = <#t>::new();
                #(#statements)*
                elements
            }}
        }
        BindingKind::MultiboundMap {
            ref contributions, ..
        } => {
            let t = ty(&binding.key)?;
            let mut statements = Vec::new();
            for ((key, _), value) in contributions.iter().zip(args) {
                let key = map_key(key)?;
                statements.push(quote! {map.insert(#key, #value);});
            }
            quote! {{
                let mut map = <#t>::new();
                #(#statements)*
                map
            }}
        }
        BindingKind::ComponentDependencyMethod { ref method, .. } => {
            let method = ident(method);
            let dependency = args
                .into_iter()
                .next()
                .with_context(|| format!("no dependency instance for {}", binding.declaration))?;
            quote! {#dependency.#method()}
        }
        _ => bail!("{} needs the component to be constructed", binding.declaration),
    })
}

/// Expression builder for one root component graph.
pub struct Context<'a> {
    pub graph: &'a BindingGraph,
    pub decl: &'a Declarations,
    pub plan: &'a Plan,
}

impl<'a> Context<'a> {
    pub fn new(graph: &'a BindingGraph, decl: &'a Declarations, plan: &'a Plan) -> Self {
        Context { graph, decl, plan }
    }

    pub fn component_ident(&self, id: ComponentId) -> Ident {
        ident(&self.plan.component(id).name)
    }

    pub fn resolved(&self, from: ComponentId, key: &Key) -> Result<&'a ResolvedBindings> {
        self.graph
            .resolved(from, key)
            .with_context(|| format!("{} is not resolved", key.readable()))
    }

    pub fn binding(&self, from: ComponentId, key: &Key) -> Result<(&'a ResolvedBindings, &'a Binding)> {
        let resolved = self.resolved(from, key)?;
        let binding = resolved
            .binding()
            .with_context(|| format!("{} has no unique binding", key.readable()))?;
        Ok((resolved, binding))
    }

    /// The type a binding of `key` produces: `Option<T>` for nullable bindings.
    pub fn produced_type(&self, from: ComponentId, key: &Key) -> Result<TokenStream> {
        let (_, binding) = self.binding(from, key)?;
        let t = ty(&key.without_qualifier())?;
        Ok(if binding.is_nullable() {
            quote! {::std::option::Option<#t>}
        } else {
            t
        })
    }

    /// Expression for the component `to` (the site's component or one of its ancestors).
    fn component_path(&self, site: Site, to: ComponentId) -> TokenStream {
        let hops = self.graph.component(site.component).depth - self.graph.component(to).depth;
        let parents = (0..hops).map(|_| quote! {.parent});
        match site.kind {
            SiteKind::Method => quote! {self #(#parents)*},
            SiteKind::Bank => quote! {component #(#parents)*},
            SiteKind::Constructor => {
                let parents = (1..hops).map(|_| quote! {.parent});
                quote! {parent #(#parents)*}
            }
        }
    }

    /// A field of component `owner`.
    pub fn field(&self, site: Site, owner: ComponentId, name: &str) -> TokenStream {
        let name = ident(name);
        if site.kind == SiteKind::Constructor && site.component == owner {
            return quote! {#name};
        }
        let path = self.component_path(site, owner);
        quote! {#path.#name}
    }

    /// A `&Weak` reference to component `owner`.
    pub fn weak(&self, site: Site, owner: ComponentId) -> TokenStream {
        if site.kind == SiteKind::Constructor && site.component == owner {
            return quote! {this};
        }
        let path = self.component_path(site, owner);
        quote! {&#path.this}
    }

    /// The module instance a provision method is called on.
    fn module_instance(&self, site: Site, owner: ComponentId, binding: &Binding) -> Result<Option<TokenStream>> {
        if !binding.requires_module_instance() {
            return Ok(None);
        }
        let module = binding
            .module
            .as_ref()
            .with_context(|| format!("{} has no module", binding.declaration))?;
        for c in self.graph.chain(owner) {
            if let Some(field) = self.plan.component(c).module_field(module) {
                return Ok(Some(self.field(site, c, field)));
            }
        }
        bail!("module {} is not installed", module.readable())
    }

    /// An owned `Provider` of the bound type of `key` as requested from `from`.
    pub fn provider(&self, site: Site, from: ComponentId, key: &Key) -> Result<TokenStream> {
        let resolved = self.resolved(from, key)?;
        let owner = resolved.owner;
        let plan = self.plan.component(owner);
        if let Some(field) = plan.provider_field(key) {
            let field = self.field(site, owner, field);
            return Ok(quote! {#field.clone()});
        }
        if let Some(id) = plan.switch_id(key) {
            let switching = ident(&plan.switching_provider_name());
            let weak = self.weak(site, owner);
            return Ok(quote! {#switching::provider(#weak, #id)});
        }
        bail!("no provider planned for {}", key.readable())
    }

    /// The value of `key` as requested from `from`.
    pub fn instance(&self, site: Site, from: ComponentId, key: &Key) -> Result<TokenStream> {
        let resolved = self.resolved(from, key)?;
        let owner = resolved.owner;
        if let Some(field) = self.plan.component(owner).provider_field(key) {
            let field = self.field(site, owner, field);
            return Ok(quote! {#field.get()});
        }
        self.construct(site, owner, key)
    }

    /// The value `request` asks for.
    pub fn request(&self, site: Site, from: ComponentId, request: &DependencyRequest) -> Result<TokenStream> {
        let (_, binding) = self.binding(from, &request.key)?;
        let nullable = binding.is_nullable();
        match request.kind {
            RequestKind::Instance => {
                let value = self.instance(site, from, &request.key)?;
                Ok(adapt_nullable(value, nullable, request))
            }
            _ => {
                let provider = self.provider(site, from, &request.key)?;
                adapt_provider(provider, nullable, request)
            }
        }
    }

    /// A new value of the binding of `key` owned by `owner`, bypassing any cached instance.
    pub fn construct(&self, site: Site, owner: ComponentId, key: &Key) -> Result<TokenStream> {
        let (_, binding) = self.binding(owner, key)?;
        match binding.kind {
            BindingKind::ComponentInstance { ref component } => {
                let weak = self.weak(site, owner);
                let handle = ty(&key::arc_dyn(component))?;
                Ok(quote! {(::dirk::internal::upgrade(#weak) as #handle)})
            }
            BindingKind::ComponentDependency { ref dependency } => {
                let field = self
                    .plan
                    .component(owner)
                    .dependency_field(dependency)
                    .with_context(|| format!("no field for {}", dependency.readable()))?;
                let field = self.field(site, owner, field);
                Ok(quote! {#field.clone()})
            }
            BindingKind::BoundInstance { ref field, .. } => {
                let field = self.field(site, owner, field);
                Ok(quote! {#field.clone()})
            }
            BindingKind::SubcomponentCreator {
                ref subcomponent,
                ref creator,
            } => {
                let parent = self.weak(site, owner);
                let value = self.new_creator(owner, subcomponent, quote! {::dirk::internal::upgrade(#parent)})?;
                let handle = ty(&key::box_dyn(creator))?;
                Ok(quote! {(::std::boxed::Box::new(#value) as #handle)})
            }
            BindingKind::AssistedFactory { ref factory, .. } => {
                let value = self.new_assisted_factory(site, owner, binding)?;
                let handle = ty(&key::arc_dyn(factory))?;
                Ok(quote! {(::std::sync::Arc::new(#value) as #handle)})
            }
            _ => {
                let mut args = Vec::new();
                for request in &binding.dependencies {
                    args.push(self.request(site, owner, request)?);
                }
                let module = self.module_instance(site, owner, binding)?;
                call(binding, args, module)
            }
        }
    }

    /// The child of `parent` that is built through a creator.
    pub fn creator_child(&self, parent: ComponentId, child_type: &TypeData) -> Result<ComponentId> {
        self.graph
            .component(parent)
            .children
            .iter()
            .copied()
            .find(|c| {
                let child = self.graph.component(*c);
                child.type_data() == child_type && child.source == Some(ChildSource::Creator)
            })
            .with_context(|| format!("{} is not installed", child_type.readable()))
    }

    /// `ChildCreator::new(parent)` for the creator of `subcomponent` below `parent`.
    pub fn new_creator(
        &self,
        parent: ComponentId,
        subcomponent: &TypeData,
        parent_arc: TokenStream,
    ) -> Result<TokenStream> {
        let child = self.creator_child(parent, subcomponent)?;
        let creator = ident(&self.plan.component(child).creator_name());
        Ok(quote! {#creator::new(#parent_arc)})
    }

    /// `Factory_Impl::new(providers...)` for an assisted factory binding.
    pub fn new_assisted_factory(&self, site: Site, owner: ComponentId, binding: &Binding) -> Result<TokenStream> {
        let name = ident(
            self.plan
                .helper_name(binding)
                .with_context(|| format!("no implementation planned for {}", binding.declaration))?,
        );
        let mut args = Vec::new();
        for request in &binding.dependencies {
            args.push(self.provider(site, owner, &request.key)?);
        }
        Ok(quote! {#name::new(#(#args),*)})
    }

    /// `Factory::new(module, providers...)` for a default mode factory struct.
    pub fn new_factory(&self, site: Site, owner: ComponentId, binding: &Binding) -> Result<TokenStream> {
        let name = ident(
            self.plan
                .helper_name(binding)
                .with_context(|| format!("no factory planned for {}", binding.declaration))?,
        );
        let mut args = Vec::new();
        if let Some(module) = self.module_instance(site, owner, binding)? {
            args.push(quote! {#module.clone()});
        }
        for request in &binding.dependencies {
            args.push(self.provider(site, owner, &request.key)?);
        }
        Ok(quote! {#name::new(#(#args),*)})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirk_common::manifest::Location;
    use pretty_assertions::assert_eq;

    fn request(type_: &str, nullable: bool) -> DependencyRequest {
        DependencyRequest::new(
            &TypeData::from_str(type_).unwrap(),
            None,
            "foo",
            nullable,
            &Location::default(),
        )
    }

    #[test]
    fn paths_of_generic_types_are_qualified() {
        let plain = TypeData::from_str("crate::Foo").unwrap();
        assert_eq!(type_path(&plain).unwrap().to_string(), "crate :: Foo");
        let generic = TypeData::from_str("crate::Foo<i32>").unwrap();
        assert_eq!(type_path(&generic).unwrap().to_string(), "< crate :: Foo < i32 > >");
    }

    #[test]
    fn adapts_provider_to_request_kind() {
        let provider = quote! {p};
        let lazy = adapt_provider(provider.clone(), false, &request("::dirk::Lazy<crate::Foo>", false)).unwrap();
        assert_eq!(lazy.to_string(), ":: dirk :: Lazy :: new (p)");
        let instance = adapt_provider(provider, false, &request("crate::Foo", false)).unwrap();
        assert_eq!(instance.to_string(), "p . get ()");
    }

    #[test]
    fn wraps_non_null_values_for_nullable_requests() {
        let value = adapt_nullable(
            quote! {v},
            false,
            &request("::std::option::Option<crate::Foo>", true),
        );
        assert_eq!(value.to_string(), ":: std :: option :: Option :: Some (v)");
        let value = adapt_nullable(quote! {v}, true, &request("crate::Foo", false));
        assert_eq!(
            value.to_string(),
            ":: dirk :: internal :: non_null (v , \"crate::Foo\")"
        );
    }

    #[test]
    fn parameter_names_fall_back_to_positions() {
        assert_eq!(parameter_ident("_", 2).to_string(), "arg2");
        assert_eq!(parameter_ident("name", 0).to_string(), "name");
    }
}
