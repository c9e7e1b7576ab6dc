//! LaTeX figure export.
//!
//! A figure saved as PDF is split by Inkscape into a text-free PDF and a
//! `.pdf_tex` overlay holding the labels. The overlay is then rewritten: the
//! include path of the PDF is pointed at the document's picture directory
//! and plain-text labels are translated to LaTeX through [`LabelRules`].
pub mod export;
pub mod rules;

pub use export::{
    latex_graphic_export, rewrite_pdf_tex, InkscapeConverter, LatexExportOptions,
    VectorConverter,
};
pub use rules::{LabelRules, Rule};
