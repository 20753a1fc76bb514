//! `amalgam_core` is the core library for the [amalgam](https://github.com/ifiokjr/amalgam) single-header generator. It takes a header-oriented library split across many module files and implementation files and produces one distributable header: every module inlined exactly once in dependency order, external includes deduplicated, per-module include guards stripped, and the implementation gated behind a single `#ifdef`.
//!
//! ## Processing Pipeline
//!
//! ```text
//! amalgam.toml
//!   → Config (library name, include root, targets)
//!   → Discovery (walks module and implementation roots in a stable order)
//!   → Module resolver (inlines internal includes depth-first, detects cycles)
//!       → Guard stripper (validates and removes per-module include guards)
//!       → External registry (keeps the first occurrence of every external include)
//!   → Implementation merger (drops internal includes, dedups external ones)
//!   → Assembler (banner, provenance stamp, document guard, implementation gate)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `amalgam.toml`.
//! - [`provenance`]: The version/timestamp stamp written into every document.
//!
//! ## Key Types
//!
//! - [`AmalgamConfig`]: Configuration loaded from `amalgam.toml`.
//! - [`ModulePath`]: Normalized identity of a module.
//! - [`ModuleResolver`]: Depth-first module inliner with explicit visit states.
//! - [`ExternalRegistry`]: Insert-once, order-preserving set of external includes.
//! - [`Assembly`]: A generated document plus the order it was built in.
//! - [`CheckOutcome`]: Result of comparing an existing output with a fresh assembly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use amalgam_core::AmalgamConfig;
//! use amalgam_core::Provenance;
//! use amalgam_core::assemble_target;
//! use amalgam_core::write_assembly;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = AmalgamConfig::load_required(root).unwrap();
//! let provenance = Provenance::from_env(&config.provenance);
//!
//! for target in config.select_targets(None).unwrap() {
//!     let assembly = assemble_target(root, &config, target, &provenance).unwrap();
//!     write_assembly(&assembly).unwrap();
//! }
//! ```

pub use assembler::*;
pub use config::*;
pub use directive::*;
pub use discovery::FileFilter;
pub use document::*;
pub use error::*;
pub use merger::*;
pub use module::*;
pub use provenance::Provenance;
pub use registry::*;
pub use resolver::*;

mod assembler;
pub mod config;
mod directive;
pub(crate) mod discovery;
mod document;
#[allow(unused_assignments)]
mod error;
mod guard;
pub(crate) mod lexer;
mod merger;
mod module;
pub mod provenance;
mod registry;
mod resolver;
