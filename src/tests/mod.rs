//! Engine tests driven against the in-memory host tree.

mod render;
