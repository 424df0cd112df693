//! Turns a selected piece of text into a glossary note.
//!
//! A language model extracts the term described by the selection along with its definition. The definition is
//! written as a new note into the vault, on the folder routed from the document the text was selected on, and the
//! first occurrence of the term on the selection is replaced with a link to the new note.
//!
//! # Features
//!
//! - Any OpenAI-compatible chat completions API, using json object or json schema responses
//! - Folder routing based on the path of the source document
//! - Local sanitization of the note names, so links always resolve
//! - Optional category tags on the note frontmatter

#![forbid(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod config;
pub mod editor;
pub mod errors;
pub mod logging;
pub mod model;
pub mod notify;
pub mod process;
pub mod service;
pub mod storage;
pub mod utils;
