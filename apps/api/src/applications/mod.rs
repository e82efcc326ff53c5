// Application records: lifecycle rules plus their HTTP handlers.

pub mod handlers;
pub mod lifecycle;
