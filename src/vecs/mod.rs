pub mod iter;
pub mod vec;

pub use iter::{Drain, IntoIter};
pub use vec::{HybridVec, StorageMode};
