mod capability;
mod class;
mod hierarchy;
mod members;
mod registry;

pub use capability::*;
pub use class::*;
pub use hierarchy::*;
pub use members::*;
pub use registry::*;
