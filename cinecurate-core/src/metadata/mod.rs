pub mod title_parser;

pub use title_parser::{ParsedTitle, parse_title};
