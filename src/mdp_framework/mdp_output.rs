use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::mdp_objects::transition_graph::TransitionGraph;

use super::mdp_file_handler::{MdpFileHandler, get_file_handler};

/// The path the graph is written to: the output path with the extension of the format appended.
pub fn output_file(output_path: &Path, file_handler: &MdpFileHandler) -> PathBuf {
    let mut file = output_path.as_os_str().to_owned();
    file.push(".");
    file.push(file_handler.file_extension);
    PathBuf::from(file)
}

/**
 * Writes the graph to `output_path.<format>`, replacing any earlier file at that path.
 * Returns the path that was written.
 */
pub fn render(graph: &TransitionGraph, output_path: &Path, format: &str) -> Result<PathBuf> {
    let file_handler = get_file_handler(format)?;
    let to_file = output_file(output_path, file_handler);

    if let Some(parent) = to_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("could not create directory {:?}", parent))?;
        }
    }

    log::info!(
        "Writing transition graph to {:?} as {} {}",
        to_file,
        file_handler.get_article(),
        file_handler
    );

    let file = File::create(&to_file).with_context(|| format!("could not create {:?}", to_file))?;
    let mut writer = BufWriter::new(file);
    file_handler
        .export(graph, &mut writer)
        .with_context(|| format!("writing {}", file_handler))?;
    writer.flush()?;

    Ok(to_file)
}

/// Renders the graph once per format, in the given order.
pub fn render_all(graph: &TransitionGraph, output_path: &Path, formats: &[&str]) -> Result<Vec<PathBuf>> {
    formats
        .iter()
        .map(|format| render(graph, output_path, format))
        .collect()
}
