// Core modules implementing line parsing, owned C text, the table, and errors.
pub mod buffer;
pub mod command;
pub mod error;
pub mod table;
pub mod text;
