use anyhow::{Result, anyhow};
use resvg::tiny_skia::{Color, Pixmap, Transform};

use crate::{
    mdp_framework::{graphable::to_svg_string, mdp_file_handler::MdpFileHandler},
    mdp_objects::transition_graph::TransitionGraph,
};

pub const FORMAT_SPECIFICATION: &str =
    "The transition graph is laid out hierarchically and rasterised on a white background.";

pub const MDP_PORTABLE_NETWORK_GRAPHICS: MdpFileHandler = MdpFileHandler {
    name: "portable network graphics",
    article: "a",
    file_extension: "png",
    format_specification: FORMAT_SPECIFICATION,
    exporter: export_as_png,
};

fn export_as_png(graph: &TransitionGraph, f: &mut dyn std::io::Write) -> Result<()> {
    let svg = to_svg_string(graph)?;
    let png = svg_to_png(&svg)?;
    Ok(f.write_all(&png)?)
}

pub fn svg_to_png(svg: &str) -> Result<Vec<u8>> {
    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = resvg::usvg::Tree::from_str(svg, &options)?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        anyhow!(
            "cannot create an image of {}x{} pixels",
            size.width(),
            size.height()
        )
    })?;
    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap.encode_png()?)
}
