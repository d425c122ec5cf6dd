//! Lexer and shunting-yard tests.

mod lexer_tests;
mod shunter_tests;
