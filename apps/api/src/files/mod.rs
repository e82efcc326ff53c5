// Files attached to applications, and the multipart/download plumbing
// shared with resume uploads.

pub mod handlers;
pub mod service;
pub mod transfer;
