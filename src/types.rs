mod descriptor;
mod token;

pub use descriptor::*;
pub use token::*;
