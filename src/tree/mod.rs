//! Declarative directory trees.
//!
//! A [`TreeSpec`] describes folders and files; [`create_tree`] materializes
//! it on disk and returns a [`PathRegistry`] keyed by logical reference
//! names, numbering duplicates. [`DirectoryTree`] is a separate resolver
//! that classifies entries by path suffix instead of spec content.

mod builder;
mod directory;
mod spec;

pub use builder::{PathRegistry, create_tree};
pub use directory::DirectoryTree;
pub use spec::{SpecKey, SpecNode, TreeSpec};
