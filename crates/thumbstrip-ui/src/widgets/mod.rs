mod thumbnail_strip;

pub use thumbnail_strip::*;
