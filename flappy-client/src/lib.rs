pub mod harness;
pub mod realtime;
pub mod render;
pub mod settings;
