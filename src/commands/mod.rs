pub mod goal;
pub mod status;
pub mod task;
pub mod user;
