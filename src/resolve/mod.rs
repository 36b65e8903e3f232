mod postal;
mod resolver;

pub use postal::{POSTAL_TABLE_FILE, PostalTable};
pub use resolver::{Resolution, ResolutionMethod, ResolutionReport, Resolver};
