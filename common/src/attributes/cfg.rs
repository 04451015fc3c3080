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

//! Evaluation of `#[cfg(..)]` predicates while scanning sources from a build script.

use anyhow::{bail, Context, Result};
use syn::punctuated::Punctuated;
use syn::{Meta, MetaList, Token};

pub trait CfgEval {
    fn eval(&self, cfg_test: bool) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationPredicate {
    Option { name: String, value: Option<String> },
    All(Vec<ConfigurationPredicate>),
    Any(Vec<ConfigurationPredicate>),
    Not(Box<ConfigurationPredicate>),
}

pub fn handle_cfg(meta_list: &MetaList) -> Result<ConfigurationPredicate> {
    let meta: Meta = syn::parse2(meta_list.tokens.clone()).with_context(|| "invalid cfg")?;
    parse_predicate(&meta)
}

fn parse_predicate(meta: &Meta) -> Result<ConfigurationPredicate> {
    match meta {
        Meta::Path(path) => Ok(ConfigurationPredicate::Option {
            name: path_name(path)?,
            value: None,
        }),
        Meta::NameValue(name_value) => {
            let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(ref value),
                ..
            }) = name_value.value
            else {
                bail!("string literal expected in cfg");
            };
            Ok(ConfigurationPredicate::Option {
                name: path_name(&name_value.path)?,
                value: Some(value.value()),
            })
        }
        Meta::List(list) => {
            let nested = list
                .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .with_context(|| "invalid cfg predicate list")?
                .iter()
                .map(parse_predicate)
                .collect::<Result<Vec<_>>>()?;
            match path_name(&list.path)?.as_str() {
                "all" => Ok(ConfigurationPredicate::All(nested)),
                "any" => Ok(ConfigurationPredicate::Any(nested)),
                "not" => {
                    let [predicate] = <[ConfigurationPredicate; 1]>::try_from(nested)
                        .ok()
                        .with_context(|| "not() takes exactly one predicate")?;
                    Ok(ConfigurationPredicate::Not(Box::new(predicate)))
                }
                other => bail!("unknown cfg operator {}", other),
            }
        }
    }
}

fn path_name(path: &syn::Path) -> Result<String> {
    Ok(path
        .get_ident()
        .with_context(|| "cfg option should be an identifier")?
        .to_string())
}

impl CfgEval for ConfigurationPredicate {
    fn eval(&self, cfg_test: bool) -> bool {
        match self {
            ConfigurationPredicate::Option { name, value } => {
                if name == "test" {
                    return cfg_test;
                }
                let env = std::env::var(format!(
                    "CARGO_CFG_{}",
                    name.to_uppercase().replace('-', "_")
                ));
                match value {
                    Some(value) => env
                        .map(|values| values.split(',').any(|v| v == value))
                        .unwrap_or(false),
                    None => env.is_ok(),
                }
            }
            ConfigurationPredicate::All(all) => all.iter().all(|p| p.eval(cfg_test)),
            ConfigurationPredicate::Any(any) => any.iter().any(|p| p.eval(cfg_test)),
            ConfigurationPredicate::Not(not) => !not.eval(cfg_test),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate(tokens: proc_macro2::TokenStream) -> ConfigurationPredicate {
        let attr: syn::Attribute = syn::parse_quote!(#[cfg(#tokens)]);
        handle_cfg(attr.meta.require_list().unwrap()).unwrap()
    }

    #[test]
    fn evaluates_test_predicates() {
        assert!(predicate(quote::quote!(test)).eval(true));
        assert!(!predicate(quote::quote!(not(test))).eval(true));
        assert!(predicate(quote::quote!(any(test, dirk_never_set))).eval(true));
        assert!(!predicate(quote::quote!(all(test, dirk_never_set))).eval(true));
    }
}
