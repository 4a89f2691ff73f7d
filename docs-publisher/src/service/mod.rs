pub mod docs;
pub mod publisher;
