pub mod namecache;
pub mod rooms;
pub mod session;
pub mod presence;
pub mod relay;
pub mod handler;
