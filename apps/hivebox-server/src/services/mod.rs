pub mod opensensemap;
pub mod temperature;
