//! One module per subcommand.  Each exposes an `execute` function.

pub mod decrypt;
pub mod drivers;
pub mod encrypt;
pub mod keygen;
pub mod list;
pub mod version;
