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

//! Declaration model shared by the dirk build script and compiler.
//!
//! [`manifest_parser`] scans Rust sources for dirk attributes and produces a [`manifest::Manifest`],
//! the input of `dirk_compiler`.

pub mod attributes;
pub mod build_log;
pub mod manifest;
pub mod manifest_parser;
pub mod parsing;
pub mod type_data;
