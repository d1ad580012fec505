use anyhow::Result;

use crate::{
    mdp_framework::{graphable::to_svg_string, mdp_file_handler::MdpFileHandler},
    mdp_objects::transition_graph::TransitionGraph,
};

pub const FORMAT_SPECIFICATION: &str =
    "The transition graph is laid out hierarchically and written as scalable vector graphics.";

pub const MDP_SCALABLE_VECTOR_GRAPHICS: MdpFileHandler = MdpFileHandler {
    name: "scalable vector graphics",
    article: "a",
    file_extension: "svg",
    format_specification: FORMAT_SPECIFICATION,
    exporter: export_as_svg,
};

fn export_as_svg(graph: &TransitionGraph, f: &mut dyn std::io::Write) -> Result<()> {
    let svg = to_svg_string(graph)?;
    Ok(f.write_all(svg.as_bytes())?)
}
