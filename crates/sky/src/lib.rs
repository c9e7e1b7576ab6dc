//! sky: plotting and experiment scaffolding helpers for lab work.
//!
//! This crate provides a structured-grid data model with reshaping and
//! interpolation, a declarative plot-object hierarchy rendered through plotly,
//! LaTeX figure export with label substitution, dated result folders with a
//! retention policy, and two small analytic demo models.
//!
//! Static image export (png/svg/pdf/latex) needs the `kaleido` feature so the
//! default build does not pull in a headless browser.
pub mod config;
pub mod error;
pub mod filemanager;
pub mod grid;
pub mod latex;
pub mod logger;
pub mod models;
pub mod plotlib;
