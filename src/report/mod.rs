pub use analysis::*;
pub use errors::*;
pub use record::*;

mod analysis;
mod errors;
mod record;
