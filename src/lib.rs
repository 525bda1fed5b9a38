//! # declsplice
//!
//! Generates binding source from C header declarations by splicing extracted
//! facts (constants, sizes, alignments, member offsets, token spans) into
//! template files.
//!
//! A template carries directive blocks. Each directive names an extraction
//! module, a flag string and one or more headers; the module queries an AST
//! service for those headers and its formatted output replaces the block.
//! See [`splice::template`] for the template format and [`splice::modules`]
//! for the available modules.
//!
//! Generated artifacts embed a platform fingerprint which they check at load
//! time through [`splice::guard`].

pub mod splice;
