pub mod page;
pub mod panel;
pub mod parser;
pub mod resolver;
