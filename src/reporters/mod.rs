pub mod writer;

pub use writer::OutputLayout;
