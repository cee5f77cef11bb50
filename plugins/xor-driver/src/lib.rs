//! Builds the placeholder XOR driver as a loadable plugin library.
//!
//! Copy the resulting `libplugvault_xor_driver.so` (or `.dylib`/`.dll`)
//! into a plugin directory, or point `--plugin-path` at `target/release`.

plugvault::export_cipher_driver!(plugvault::driver::XorDriver);
