//! Filesystem operations used by the executor.

mod atomic;
mod copy;
mod duplicate;
mod helpers;
mod io_copy;
mod lock;
mod metadata;
mod transfer;
mod util;

pub use copy::safe_copy_and_rename;
pub use duplicate::{resolve_destination, resolve_destination_with};
pub use helpers::io_error_with_help;
pub use lock::{DirLock, acquire_dir_lock};
pub use metadata::preserve_metadata;
pub use transfer::{TransferError, Transferred, transfer};
pub use util::{INTERNAL_PREFIX, is_internal_name};
