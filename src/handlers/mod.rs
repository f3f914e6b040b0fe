pub mod health;
pub mod documents;
pub mod access;
pub mod diagnostics;

pub use health::*;
pub use documents::*;
pub use access::*;
pub use diagnostics::*;
