mod address;
mod call_data;

pub use address::*;
pub use call_data::*;
