//! Reconstruction passes over the converter's line-oriented output.
//!
//! Each submodule implements exactly one repair. Keeping passes separate
//! makes each independently testable and keeps the index arithmetic of one
//! pass from leaking into another.
//!
//! ## Data Flow
//!
//! ```text
//! converter output (one string)
//!   │
//!   ├─ tables     rebuild pipe-delimited blocks      (whole document)
//!   ├─ refs       resolve chapter cross-references   (whole document)
//!   ▼
//! lines (Vec<String>)
//!   │
//!   ├─ footnotes  extract definitions                (whole document)
//!   ├─ headings   classify levels, split into units
//!   ▼
//! per unit
//!   ├─ citations  rewrite \cite macros
//!   ├─ math       re-indent blocks, expand macros
//!   ├─ figures    rebuild placeholder spans
//!   ├─ lists      force continuation indents
//!   └─ footnotes  re-attach referenced definitions
//! ```
//!
//! The two string-level passes run before splitting because their matches
//! routinely span what later become unit boundaries. Everything after the
//! split sees only its own unit and the read-only lookup tables.

pub mod citations;
pub mod figures;
pub mod footnotes;
pub mod headings;
pub mod lines;
pub mod lists;
pub mod math;
pub mod refs;
pub mod tables;
