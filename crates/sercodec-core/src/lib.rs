pub mod error;
pub mod frame;
pub mod header;
pub mod reader;
pub mod timestamp;
pub mod writer;
