pub mod booking;
pub mod status;
pub mod theatre;
pub mod user;

pub use booking::Booking;
pub use theatre::Theatre;
pub use user::User;
