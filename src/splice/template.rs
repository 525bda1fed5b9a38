//! Templates
//!
//! A template is any text file carrying directive blocks:
//!
//! ```text
//! pub const SIZEOF_TIME_T: usize =
//! @@extract
//! sizeof -p time_t time.h
//! @@end
//! ;
//! ```
//!
//! Each block is replaced by the rows its directives produce, one row per
//! line. Consecutive composite (`-C`) rows of a block are comma-joined onto a
//! single line so they can sit inside an array or map literal. A block whose
//! directives produce nothing disappears entirely. Everything outside blocks
//! is copied through unchanged.
//!
//! The scanner ([`scanner`]) finds the blocks, the engine ([`engine`]) runs
//! them.

pub mod engine;
pub mod scanner;

pub use engine::TemplateEngine;
pub use scanner::{scan, Block, DirectiveLine, Markers, Segment};
