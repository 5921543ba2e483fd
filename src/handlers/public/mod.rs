// handlers/public - anonymous reads of portfolio data
//
// No middleware: anything published under `/public`, `/id` or the search
// routes is readable without a token.

pub mod category;
pub mod portfolio;
pub mod project;
pub mod section;
pub mod section_content;
