// Typed records for every collection the data access layer touches

pub mod date;
pub mod family;
pub mod notification;
pub mod request;
pub mod service;
pub mod user;

pub use date::*;
pub use family::*;
pub use notification::*;
pub use request::*;
pub use service::*;
pub use user::*;
