pub mod booking;
pub mod notification;
pub mod storage;
pub mod theatre;
