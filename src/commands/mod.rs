pub mod convert;
pub mod resolve;
pub mod suggest;
