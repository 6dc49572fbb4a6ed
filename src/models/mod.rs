// Data types shared between handlers and services

pub mod errors;
pub mod public_url;
pub mod uploaded_file;
