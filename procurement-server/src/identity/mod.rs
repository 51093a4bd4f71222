pub mod entities;
pub mod repository;
pub mod resolver;
