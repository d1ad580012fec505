use anyhow::Result;
use layout::{
    adt::dag::NodeHandle,
    backends::svg::SVGWriter,
    core::{
        base::Orientation,
        style::{LineStyleKind, StyleAttr},
    },
    std_shapes::{
        render::get_shape_size,
        shapes::{Arrow, Element, LineEndKind, ShapeKind},
    },
    topo::layout::VisualGraph,
};

pub trait Graphable {
    fn to_dot(&self) -> Result<VisualGraph>;
}

impl dyn Graphable {
    pub fn create_node(graph: &mut VisualGraph, shape: ShapeKind, look: StyleAttr) -> NodeHandle {
        let orientation = Orientation::LeftToRight;
        let size = get_shape_size(orientation, &shape, look.font_size, false);
        let node = Element::create(shape, look, orientation, size);
        graph.add_node(node)
    }

    /// The pen width is rounded to whole pixels, but never below one so that unlikely transitions stay visible.
    pub fn create_edge(
        graph: &mut VisualGraph,
        from: &NodeHandle,
        to: &NodeHandle,
        line_style: LineStyleKind,
        pen_width: f64,
        label: &str,
    ) {
        let mut look = StyleAttr::simple();
        look.line_width = (pen_width.round() as usize).max(1);
        let arrow = Arrow::new(
            LineEndKind::None,
            LineEndKind::Arrow,
            line_style,
            label,
            &look,
            &None,
            &None,
        );
        graph.add_edge(arrow, *from, *to);
    }
}

pub fn empty_svg() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?><svg width=\"352.5\" height=\"141\" viewBox=\"0 0 352.5 141\" xmlns=\"http://www.w3.org/2000/svg\"></svg>".to_string()
}

pub fn to_svg_string<T>(object: &T) -> Result<String>
where
    T: Graphable + ?Sized,
{
    let mut svg = SVGWriter::new();
    let mut graph = object.to_dot()?;
    Ok(if graph.num_nodes() == 0 {
        empty_svg()
    } else {
        graph.do_it(false, false, false, &mut svg);
        svg.finalize()
    })
}
