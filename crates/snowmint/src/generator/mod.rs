mod backoff;
mod interface;
mod lock;
mod mutex;
mod policy;
mod status;

pub use backoff::*;
pub use interface::*;
pub use lock::*;
pub use policy::*;
pub use status::*;
