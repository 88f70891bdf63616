//! Pipeline stages of the Conversion Unit.
//!
//! Each submodule implements exactly one step, so each is testable on its own
//! and an extractor backend can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ enhance ──▶ write
//! (path/URL)  (Extractor)  (passes)   (name + atomic write)
//! ```
//!
//! 1. [`input`]: decide file vs URL mode and derive the output stem
//! 2. [`extract`]: the [`extract::Extractor`] seam and the built-in text/HTTP
//!    extractor
//! 3. [`enhance`]: the Structural Enhancer; pure text → text, run in
//!    `spawn_blocking`
//! 4. [`write`]: apply the overwrite policy and write atomically

pub mod enhance;
pub mod extract;
pub mod input;
pub mod write;
