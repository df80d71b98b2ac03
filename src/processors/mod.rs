//! File processors built on the translation pipeline

pub mod book;
