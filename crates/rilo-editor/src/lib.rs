//! # rilo-editor — Editor core for rilo
//!
//! This crate contains the text engine underneath the editor binary:
//!
//! - **[`row`]** — `Row`: one line's raw bytes plus its tab-expanded render
//!   form, with the cx↔rx coordinate mapping
//! - **[`buffer`]** — `TextBuffer`: the ordered row store with editing
//!   operations, file load/save, and the modified flag
//! - **[`view`]** — `Viewport`: scroll offsets, row/status-bar painting
//! - **[`search`]** — incremental directional substring search state
//!
//! The model is deliberately byte/column oriented: a row is a sequence of
//! bytes, a screen column is one byte of the render form. Tabs are the only
//! characters that render wider than they are stored.

pub mod buffer;
pub mod row;
pub mod search;
pub mod view;
