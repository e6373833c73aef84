pub mod assembler;
pub mod decoder;
pub mod rewrite;
pub mod scanner;
