pub mod resolution;
pub mod score_graph;

mod axes_draw;
