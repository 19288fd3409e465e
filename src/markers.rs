mod builtin;
mod hash;
mod kind;
mod literal;
mod marker;
mod value;

pub use builtin::*;
pub use kind::*;
pub use literal::*;
pub use marker::*;
pub use value::*;
