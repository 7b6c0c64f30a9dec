pub mod dag;
pub mod precedence;

pub use dag::NetworkDag;
pub use precedence::{PrecedenceError, PrecedenceGraphBuilder};
