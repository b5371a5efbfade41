pub mod protocol;
pub mod session;
pub mod shared;
pub mod worker;
