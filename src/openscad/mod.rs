// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD subprocess integration - executable detection and invocation

pub mod compiler;
pub mod locator;
pub mod runner;

pub use compiler::{classify, compile, Compiler, ERROR_MARKER};
pub use locator::{detect_executable, known_locations, ExecutableLocator, Probe};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
