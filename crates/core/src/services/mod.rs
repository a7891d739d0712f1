mod decomposer;
mod reconciliation;

pub use decomposer::*;
pub use reconciliation::*;
