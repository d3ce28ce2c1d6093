use bevy::{
    core_pipeline::{
        core_3d::graph::{Core3d, Node3d},
        fullscreen_vertex_shader::fullscreen_shader_vertex_state,
    },
    ecs::query::QueryItem,
    image::BevyDefault,
    prelude::*,
    render::{
        Render, RenderApp, RenderSet,
        extract_component::{
            ComponentUniforms, DynamicUniformIndex, ExtractComponent, ExtractComponentPlugin,
            UniformComponentPlugin,
        },
        render_graph::{
            NodeRunError, RenderGraphApp, RenderGraphContext, RenderLabel, ViewNode, ViewNodeRunner,
        },
        render_resource::{
            binding_types::{sampler, texture_2d, uniform_buffer},
            *,
        },
        renderer::{RenderContext, RenderDevice},
        view::{ExtractedView, ViewTarget},
    },
};
use constants::render_settings::{DITHER_BIAS, DITHER_LEVELS, DITHER_PIXEL_SIZE};

const DITHER_SHADER_PATH: &str = "shaders/dither_postprocess.wgsl";

/// Ordered dithering after tonemapping. Only cameras carrying
/// [`DitherSettings`] get the pass; `present_frame` adds and removes it.
pub struct DitherPostProcessPlugin;

impl Plugin for DitherPostProcessPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ExtractComponentPlugin::<DitherSettings>::default(),
            UniformComponentPlugin::<DitherSettings>::default(),
        ));

        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .init_resource::<SpecializedRenderPipelines<DitherPipeline>>()
            .add_systems(Render, specialize_dither_pipelines.in_set(RenderSet::Prepare))
            .add_render_graph_node::<ViewNodeRunner<DitherNode>>(Core3d, DitherPass)
            .add_render_graph_edges(
                Core3d,
                (Node3d::Tonemapping, DitherPass, Node3d::EndMainPassPostProcessing),
            );
    }

    fn finish(&self, app: &mut App) {
        if let Some(render_app) = app.get_sub_app_mut(RenderApp) {
            render_app.init_resource::<DitherPipeline>();
        }
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
struct DitherPass;

#[derive(Component, Clone, Copy, ExtractComponent, ShaderType)]
pub struct DitherSettings {
    /// Target size in physical pixels.
    pub resolution: Vec2,
    /// Shifts the ordered-dither threshold; higher values brighten.
    pub bias: f32,
    pub pixel_size: f32,
}

impl Default for DitherSettings {
    fn default() -> Self {
        Self {
            resolution: Vec2::ONE,
            bias: DITHER_BIAS,
            pixel_size: DITHER_PIXEL_SIZE,
        }
    }
}

/// Bind group layout and sampler shared by every specialisation.
#[derive(Resource)]
struct DitherPipeline {
    layout: BindGroupLayout,
    sampler: Sampler,
    shader: Handle<Shader>,
}

impl FromWorld for DitherPipeline {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();
        let layout = render_device.create_bind_group_layout(
            "dither_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::FRAGMENT,
                (
                    texture_2d(TextureSampleType::Float { filterable: false }),
                    sampler(SamplerBindingType::NonFiltering),
                    uniform_buffer::<DitherSettings>(true),
                ),
            ),
        );
        // Nearest sampling keeps dither cells crisp.
        let sampler = render_device.create_sampler(&SamplerDescriptor {
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..default()
        });

        Self {
            layout,
            sampler,
            shader: world.load_asset(DITHER_SHADER_PATH),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DitherPipelineKey {
    target_format: TextureFormat,
}

impl SpecializedRenderPipeline for DitherPipeline {
    type Key = DitherPipelineKey;

    fn specialize(&self, key: Self::Key) -> RenderPipelineDescriptor {
        RenderPipelineDescriptor {
            label: Some("dither".into()),
            layout: vec![self.layout.clone()],
            vertex: fullscreen_shader_vertex_state(),
            fragment: Some(FragmentState {
                shader: self.shader.clone(),
                shader_defs: vec![ShaderDefVal::UInt("DITHER_LEVELS".into(), DITHER_LEVELS)],
                entry_point: "fragment".into(),
                targets: vec![Some(ColorTargetState {
                    format: key.target_format,
                    blend: None,
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            push_constant_ranges: Vec::new(),
            zero_initialize_workgroup_memory: false,
        }
    }
}

/// Pipeline chosen for a view's target format.
#[derive(Component)]
struct ViewDitherPipeline(CachedRenderPipelineId);

fn specialize_dither_pipelines(
    mut commands: Commands,
    pipeline_cache: Res<PipelineCache>,
    mut pipelines: ResMut<SpecializedRenderPipelines<DitherPipeline>>,
    dither_pipeline: Res<DitherPipeline>,
    views: Query<(Entity, &ExtractedView), With<DitherSettings>>,
) {
    for (entity, view) in &views {
        let target_format = if view.hdr {
            ViewTarget::TEXTURE_FORMAT_HDR
        } else {
            TextureFormat::bevy_default()
        };
        let id = pipelines.specialize(
            &pipeline_cache,
            &dither_pipeline,
            DitherPipelineKey { target_format },
        );
        commands.entity(entity).insert(ViewDitherPipeline(id));
    }
}

#[derive(Default)]
struct DitherNode;

impl ViewNode for DitherNode {
    type ViewQuery = (
        &'static ViewTarget,
        &'static ViewDitherPipeline,
        &'static DynamicUniformIndex<DitherSettings>,
    );

    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        (target, view_pipeline, uniform_index): QueryItem<Self::ViewQuery>,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let Some(pipeline) = world
            .resource::<PipelineCache>()
            .get_render_pipeline(view_pipeline.0)
        else {
            return Ok(());
        };
        let Some(uniforms) = world
            .resource::<ComponentUniforms<DitherSettings>>()
            .uniforms()
            .binding()
        else {
            return Ok(());
        };

        let dither = world.resource::<DitherPipeline>();
        let post_process = target.post_process_write();
        let bind_group = render_context.render_device().create_bind_group(
            "dither_bind_group",
            &dither.layout,
            &BindGroupEntries::sequential((post_process.source, &dither.sampler, uniforms)),
        );

        let mut pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
            label: Some("dither_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: post_process.destination,
                resolve_target: None,
                ops: Operations::default(),
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_render_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[uniform_index.index()]);
        pass.draw(0..3, 0..1);

        Ok(())
    }
}
