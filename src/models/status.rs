//! Status values stored in the `status` columns.

pub mod user_role {
    pub const CUSTOMER: &str = "CUSTOMER";
    pub const THEATRE_MANAGER: &str = "THEATRE_MANAGER";
    pub const ADMIN: &str = "ADMIN";
}

pub mod theatre_status {
    pub const PENDING: &str = "PENDING";
    pub const ACTIVE: &str = "ACTIVE";
    pub const DEACTIVATED: &str = "DEACTIVATED";
}

pub mod active_status {
    pub const ACTIVE: &str = "ACTIVE";
    pub const DEACTIVATED: &str = "DEACTIVATED";
}

pub mod show_status {
    pub const UPCOMING: &str = "UPCOMING";
    pub const ACTIVE: &str = "ACTIVE";
    pub const CANCELLED: &str = "CANCELLED";
    pub const COMPLETED: &str = "COMPLETED";
}

pub mod booking_status {
    pub const AVAILABLE: &str = "AVAILABLE";
    pub const BOOKED: &str = "BOOKED";
    pub const CANCELLED: &str = "CANCELLED";
}
