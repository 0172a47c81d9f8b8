mod text;

pub use text::TextLoader;
