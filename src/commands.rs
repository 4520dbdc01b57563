pub mod download;
pub mod load;
pub mod status;
