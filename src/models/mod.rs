mod blood_stock;
mod notification;
mod user_profile;

pub use blood_stock::*;
pub use notification::*;
pub use user_profile::*;
