//! Pipeline stages for a single module.
//!
//! ## Data Flow
//!
//! ```text
//! overview.md ──▶ extract ──▶ -bb.md ──▶ docx ──▶ -bb.docx
//!                (markers)   (review)   (pandoc)
//! ```
//!
//! 1. [`extract`]: find the student-facing block via the marker pair or the
//!    legacy heading; pure text in, optional text out
//! 2. [`docx`]:    hand the block to the document converter behind the
//!    [`docx::DocumentConverter`] trait
//!
//! Writing the intermediate markdown between the two stages is done by
//! [`crate::process`], which owns all filesystem side effects.

pub mod docx;
pub mod extract;
