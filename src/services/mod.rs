// Business logic services module

pub mod file_storage;
pub mod qr_generator;
pub mod tunnel;
