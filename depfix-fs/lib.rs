mod absolute;
mod relative;

pub use absolute::*;
pub use relative::*;
