//! Entry points shared between the host and plugin libraries.
//!
//! A plugin is a `cdylib` that exports three unmangled functions:
//!
//! ```text
//! plugvault_driver_abi_version()   -> u32              must equal PLUGIN_ABI_VERSION
//! plugvault_driver_core_version()  -> *const c_char    must equal this crate's version
//! plugvault_driver_create()        -> *mut DriverBox   heap-allocated driver, owned by the host
//! ```
//!
//! The boxed trait object only has a stable layout when host and plugin
//! are built from the same `plugvault` version with the same compiler,
//! so the loader refuses libraries whose versions differ.  Plugins
//! should use [`export_cipher_driver!`](crate::export_cipher_driver)
//! rather than writing these by hand.

use std::os::raw::c_char;

use super::CipherDriver;

/// Bumped whenever the entry point signatures change.
pub const PLUGIN_ABI_VERSION: u32 = 1;

pub const ABI_VERSION_SYMBOL: &[u8] = b"plugvault_driver_abi_version\0";
pub const CORE_VERSION_SYMBOL: &[u8] = b"plugvault_driver_core_version\0";
pub const CREATE_SYMBOL: &[u8] = b"plugvault_driver_create\0";

/// Version of this crate, NUL-terminated for the C ABI.
pub const CORE_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// What `plugvault_driver_create` hands back, behind a thin pointer.
pub type DriverBox = Box<dyn CipherDriver>;

pub type AbiVersionFn = unsafe extern "C" fn() -> u32;
pub type CoreVersionFn = unsafe extern "C" fn() -> *const c_char;
#[allow(improper_ctypes_definitions)]
pub type CreateFn = unsafe extern "C" fn() -> *mut DriverBox;

/// The host's core version without the trailing NUL.
pub fn core_version() -> &'static str {
    CORE_VERSION.trim_end_matches('\0')
}

/// Export a cipher driver from a `cdylib` crate.
///
/// ```ignore
/// plugvault::export_cipher_driver!(MyDriver::default());
/// ```
#[macro_export]
macro_rules! export_cipher_driver {
    ($constructor:expr) => {
        #[no_mangle]
        pub extern "C" fn plugvault_driver_abi_version() -> u32 {
            $crate::driver::plugin::PLUGIN_ABI_VERSION
        }

        #[no_mangle]
        pub extern "C" fn plugvault_driver_core_version() -> *const ::std::os::raw::c_char {
            $crate::driver::plugin::CORE_VERSION
                .as_ptr()
                .cast::<::std::os::raw::c_char>()
        }

        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn plugvault_driver_create() -> *mut $crate::driver::plugin::DriverBox {
            let driver: $crate::driver::plugin::DriverBox = ::std::boxed::Box::new($constructor);
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(driver))
        }
    };
}
