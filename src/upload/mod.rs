mod client;

pub use client::{UploadClient, UploadResponse};
