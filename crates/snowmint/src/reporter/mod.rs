mod rate;

pub use rate::*;
