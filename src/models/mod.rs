pub mod doc;
pub mod documents;
pub mod health;
pub mod diagnostics;
pub mod messages;
pub mod error;

pub use doc::*;
pub use documents::*;
pub use health::*;
pub use diagnostics::*;
pub use error::*;
