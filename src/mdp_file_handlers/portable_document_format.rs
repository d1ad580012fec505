use anyhow::{Result, anyhow};
use svg2pdf::{ConversionOptions, PageOptions};

use crate::{
    mdp_framework::{graphable::to_svg_string, mdp_file_handler::MdpFileHandler},
    mdp_objects::transition_graph::TransitionGraph,
};

pub const FORMAT_SPECIFICATION: &str =
    "The transition graph is laid out hierarchically and written as a single-page portable document.";

pub const MDP_PORTABLE_DOCUMENT_FORMAT: MdpFileHandler = MdpFileHandler {
    name: "portable document format",
    article: "a",
    file_extension: "pdf",
    format_specification: FORMAT_SPECIFICATION,
    exporter: export_as_pdf,
};

fn export_as_pdf(graph: &TransitionGraph, f: &mut dyn std::io::Write) -> Result<()> {
    let svg = to_svg_string(graph)?;
    let pdf = svg_to_pdf(&svg)?;
    Ok(f.write_all(&pdf)?)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut options = svg2pdf::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = svg2pdf::usvg::Tree::from_str(svg, &options)?;
    match svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default()) {
        Ok(pdf) => Ok(pdf),
        Err(err) => Err(anyhow!("could not convert to PDF: {}", err)),
    }
}
