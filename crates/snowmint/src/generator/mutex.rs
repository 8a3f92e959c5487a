pub(crate) use parking_lot::{Mutex, MutexGuard};
