pub mod attendance;
pub mod profile;
pub mod role;
pub mod user;
pub mod withdrawal;
pub mod summary;
