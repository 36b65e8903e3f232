mod address;
mod level;
mod records;

pub use address::{Address, Coordinates};
pub use level::Level;
pub use records::{Constituency, Representative};
