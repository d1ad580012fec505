use anyhow::{Result, anyhow};
use std::{fmt::Display, io::Write};

use crate::{
    mdp_file_handlers::{
        graphviz_dot::MDP_GRAPHVIZ_DOT, portable_document_format::MDP_PORTABLE_DOCUMENT_FORMAT,
        portable_network_graphics::MDP_PORTABLE_NETWORK_GRAPHICS,
        scalable_vector_graphics::MDP_SCALABLE_VECTOR_GRAPHICS,
    },
    mdp_objects::transition_graph::TransitionGraph,
};

/**
 * The formats a transition graph can be written in.
 * The order of this list is the order in which formats are listed to the user.
 */
pub const MDP_FILE_HANDLERS: &'static [MdpFileHandler] = &[
    MDP_PORTABLE_NETWORK_GRAPHICS,
    MDP_PORTABLE_DOCUMENT_FORMAT,
    MDP_SCALABLE_VECTOR_GRAPHICS,
    MDP_GRAPHVIZ_DOT,
];

#[derive(Clone, Debug)]
pub struct MdpFileHandler {
    pub name: &'static str,
    pub article: &'static str, //a or an
    pub file_extension: &'static str,
    pub format_specification: &'static str,
    pub exporter: fn(graph: &TransitionGraph, f: &mut dyn Write) -> Result<()>,
}

impl MdpFileHandler {
    pub fn get_article(&self) -> &str {
        self.article
    }

    pub fn export(&self, graph: &TransitionGraph, f: &mut dyn Write) -> Result<()> {
        (self.exporter)(graph, f)
    }
}

impl Display for MdpFileHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (.{})", self.name, self.file_extension)
    }
}

impl PartialEq for MdpFileHandler {
    fn eq(&self, other: &Self) -> bool {
        self.file_extension == other.file_extension
    }
}

impl Eq for MdpFileHandler {}

pub fn get_file_handler(file_extension: &str) -> Result<&'static MdpFileHandler> {
    let file_extension = file_extension.trim_start_matches('.').to_lowercase();
    MDP_FILE_HANDLERS
        .iter()
        .find(|file_handler| file_handler.file_extension == file_extension)
        .ok_or_else(|| {
            anyhow!(
                "file extension `{}` is not supported; supported are {}",
                file_extension,
                get_file_extensions().join(", ")
            )
        })
}

pub fn get_file_extensions() -> Vec<&'static str> {
    MDP_FILE_HANDLERS
        .iter()
        .map(|file_handler| file_handler.file_extension)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{MDP_FILE_HANDLERS, get_file_handler};

    #[test]
    fn lookup() {
        for file_handler in MDP_FILE_HANDLERS {
            assert_eq!(get_file_handler(file_handler.file_extension).unwrap(), file_handler);
        }
        assert_eq!(get_file_handler(".PNG").unwrap().file_extension, "png");
        assert!(get_file_handler("gif").is_err());
    }
}
