use std::rc::Rc;
use api_types::handle::TextureHandle;
use api_types::image::{SamplingMode, TextureCreationOptions};
use api_types::shader::ShaderEffect;
use context::enter_span;
use context::render_context::RenderContext;
use framegraph::error::FrameGraphError;
use framegraph::frame_graph::FrameGraph;
use framegraph::pass_node::PassNode;
use framegraph::task::Task;

/// Runs a full-screen effect sampling `source`.
///
/// Without an explicit target the task writes into a new texture created
/// like the source. While disabled the source is copied to the output
/// instead.
pub struct PostProcessTask {
    name: String,
    source: TextureHandle,
    target: Option<TextureHandle>,
    effect: Rc<dyn ShaderEffect>,
    sampler_name: String,
    sampling_mode: SamplingMode,
    output: TextureHandle
}

impl PostProcessTask {
    pub fn new(name: &str, frame_graph: &FrameGraph, source: TextureHandle, effect: Rc<dyn ShaderEffect>) -> Self {
        PostProcessTask {
            name: name.to_string(),
            source,
            target: None,
            effect,
            sampler_name: "textureSampler".to_string(),
            sampling_mode: SamplingMode::Bilinear,
            output: frame_graph.get_texture_manager().borrow_mut().create_dangling_handle()
        }
    }

    pub fn with_target(mut self, target: TextureHandle) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_sampling_mode(mut self, sampling_mode: SamplingMode) -> Self {
        self.sampling_mode = sampling_mode;
        self
    }

    pub fn with_sampler_name(mut self, sampler_name: &str) -> Self {
        self.sampler_name = sampler_name.to_string();
        self
    }

    pub fn get_output_texture(&self) -> TextureHandle {
        self.output
    }
}

impl Task for PostProcessTask {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_class_name(&self) -> &str {
        "PostProcessTask"
    }

    fn is_ready(&self) -> Result<bool, FrameGraphError> {
        Ok(self.effect.is_ready())
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError> {
        let textures = frame_graph.get_texture_manager();
        match self.target {
            Some(target) => {
                textures.borrow_mut().resolve_dangling_handle(self.output, target, None, None)?;
            },
            None => {
                let source_options = textures.borrow().get_texture_creation_options(self.source)?;
                let creation_options = TextureCreationOptions {
                    is_history: false,
                    ..source_options
                };
                textures.borrow_mut().resolve_dangling_handle(
                    self.output,
                    self.source,
                    Some(&self.name),
                    Some(creation_options))?;
            }
        }

        let (source, effect, sampler_name) = (self.source, self.effect.clone(), self.sampler_name.clone());
        frame_graph.add_render_pass(&self.name, false)?
            .set_render_target(self.output)
            .add_dependencies(&[source])
            .set_execute_func(move |render_context: &mut RenderContext| {
                enter_span!(tracing::Level::TRACE, "Post process");
                let applied = render_context.apply_full_screen_effect(effect.as_ref(), |render_context| {
                    render_context.bind_texture_handle(effect.as_ref(), &sampler_name, source)
                })?;
                if !applied {
                    log::trace!(target: "passes", "Effect {} is not ready, skipping", effect.get_name());
                }
                Ok(())
            });

        frame_graph.add_render_pass(&format!("{} (disabled)", self.name), true)?
            .set_render_target(self.output)
            .add_dependencies(&[source])
            .set_execute_func(move |render_context: &mut RenderContext| {
                render_context.copy_texture(source, false)?;
                Ok(())
            });

        Ok(())
    }

    fn on_textures_allocated(&mut self, render_context: &mut RenderContext) -> Result<(), FrameGraphError> {
        render_context.set_texture_sampling_mode(self.source, self.sampling_mode)?;
        Ok(())
    }
}
