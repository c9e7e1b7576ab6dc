pub mod demo;
pub mod latex;
pub mod plot;
pub mod results;
