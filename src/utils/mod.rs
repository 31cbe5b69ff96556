//! Internal helpers shared by the collections.

pub mod poison;
