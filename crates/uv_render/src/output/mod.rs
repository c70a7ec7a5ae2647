pub mod ansi;
pub mod markup;
pub mod text;
