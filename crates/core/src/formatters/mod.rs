pub mod markdown;

pub use markdown::{MarkdownConfig, MarkdownFormatter, convert_to_markdown};
