use anyhow::Result;

use crate::{
    mdp_framework::mdp_file_handler::MdpFileHandler,
    mdp_objects::transition_graph::{FORMAT_SPECIFICATION, TransitionGraph},
};

pub const MDP_GRAPHVIZ_DOT: MdpFileHandler = MdpFileHandler {
    name: "graphviz dot",
    article: "a",
    file_extension: "dot",
    format_specification: FORMAT_SPECIFICATION,
    exporter: export_as_dot,
};

fn export_as_dot(graph: &TransitionGraph, f: &mut dyn std::io::Write) -> Result<()> {
    Ok(write!(f, "{}", graph)?)
}
