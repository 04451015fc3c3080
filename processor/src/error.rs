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

use backtrace::Backtrace;
use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use std::cell::RefCell;
use std::panic::UnwindSafe;

struct Panic {
    backtrace: Backtrace,
    msg: String,
}

thread_local! {
    static PANIC: RefCell<Option<Panic>> = const { RefCell::new(None) };
}

/// Runs an attribute handler, turning both `Err` results and panics into `compile_error!`s.
pub fn handle_error<F>(f: F) -> proc_macro::TokenStream
where
    F: FnOnce() -> Result<TokenStream, TokenStream> + UnwindSafe,
{
    PANIC.with(|p| *p.borrow_mut() = None);
    std::panic::set_hook(Box::new(|info| {
        let panic = Panic {
            backtrace: Backtrace::new(),
            msg: info.to_string(),
        };
        PANIC.with(|p| *p.borrow_mut() = Some(panic));
    }));
    let result = std::panic::catch_unwind(f);
    let _ = std::panic::take_hook();

    match result {
        Ok(Ok(tokens)) | Ok(Err(tokens)) => tokens.into(),
        Err(payload) => match PANIC.with(|p| p.borrow_mut().take()) {
            Some(p) => {
                let msg = format!("dirk panicked:\n{}\n{:#?}", p.msg, p.backtrace);
                quote! {
                    compile_error!(#msg);
                }
                .into()
            }
            None => std::panic::resume_unwind(payload),
        },
    }
}

#[must_use]
pub fn spanned_compile_error<T>(span: Span, message: &str) -> Result<T, TokenStream> {
    Err(quote_spanned! {span=>
        compile_error!(#message);
    })
}

pub trait CompileError<T> {
    fn map_spanned_compile_error(self, span: Span, message: &str) -> Result<T, TokenStream>;
}

impl<T> CompileError<T> for Option<T> {
    fn map_spanned_compile_error(self, span: Span, message: &str) -> Result<T, TokenStream> {
        self.ok_or(quote_spanned! {span=>
            compile_error!(#message);
        })
    }
}

impl<T, E> CompileError<T> for Result<T, E> {
    fn map_spanned_compile_error(self, span: Span, message: &str) -> Result<T, TokenStream> {
        self.map_err(|_| {
            quote_spanned! {span=>
                compile_error!(#message);
            }
        })
    }
}
