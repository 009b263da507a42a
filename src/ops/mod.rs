pub mod columns;
pub mod issue_text;
pub mod normalize;
