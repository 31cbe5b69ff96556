pub mod a_star;

pub use a_star::{Path, a_star, a_star_with_capacity};
