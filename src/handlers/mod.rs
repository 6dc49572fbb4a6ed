// HTTP request handlers, one module per route

pub mod download;
pub mod files;
pub mod qr;
pub mod upload;
