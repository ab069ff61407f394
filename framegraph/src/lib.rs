pub mod compiler;
pub mod cull_pass_node;
pub mod error;
pub mod frame_graph;
pub mod normal_pass_node;
pub mod pass_node;
pub mod pass_type;
pub mod ready;
pub mod render_pass_node;
pub mod task;
