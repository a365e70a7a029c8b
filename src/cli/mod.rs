mod root;
mod submit;

pub use root::Cli;
