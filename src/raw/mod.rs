mod arena;
mod handle;
mod link;
mod weight;

pub use arena::Arena;
pub use handle::Handle;
pub use link::Link;
pub(crate) use weight::Weight;
