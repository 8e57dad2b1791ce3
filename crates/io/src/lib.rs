// Text codecs and file I/O

pub mod clipboard;
pub mod files;
pub mod json;
pub mod markdown;
