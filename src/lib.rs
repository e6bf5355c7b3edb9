pub mod contexts;
pub mod data;
pub mod providers;
pub mod registries;
pub mod tools;
