//! The render-data pipeline and its stateful facade.
//!
//! `compute_render_data` is a pure function of its inputs. `ChartPipeline`
//! memoizes it behind one explicitly keyed cache and feeds the result to the
//! keyed render engine, the interaction controller and a `Renderer`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::band_chart_builder::build_band_chart;
use crate::api::chart_builder::{BuildContext, collect_keys, ordered_keys};
use crate::api::combo_chart_builder::{
    build_combo_dual, build_combo_line_column, build_combo_single,
};
use crate::api::line_chart_builder::{build_area_chart, build_line_chart};
use crate::api::map_chart_builder::build_map_chart;
use crate::api::pie_chart_builder::build_pie_chart;
use crate::api::scatter_chart_builder::build_scatter_chart;
use crate::api::scene::{AnimationFrames, ChartScene};
use crate::api::table_builder::build_table;
use crate::api::{ChartInputs, PipelineConfig};
use crate::core::variables::AnimationVariable;
use crate::core::{
    ChartBounds, ChartConfig, ChartVariables, Components, MeasureBasis, Observation, Sorting,
    bind_variables, impute_observations, prepare,
};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{InteractionListener, TooltipContent};
use crate::interaction::{BandOrientation, InteractionController, InteractionState};
use crate::render::{KeyedRenderEngine, RenderDiff, RenderFrame, Renderer};

/// Frame values of `animation` over `rows`, in display order.
fn animation_frames(animation: &AnimationVariable, rows: &[Observation]) -> Vec<String> {
    let labels = collect_keys(rows, |row| {
        let key = animation.accessor.key(row)?;
        let label = animation.accessor.label(row).unwrap_or_else(|| key.clone());
        Some((key, label))
    });
    ordered_keys(&labels, Some(&animation.dimension), Sorting::default(), MeasureBasis::None)
}

/// Builds the scene for one render pass.
///
/// Configuration errors are returned; an unsupported combination yields a
/// scene carrying only a hint.
pub fn compute_render_data(
    inputs: &ChartInputs,
    config: &ChartConfig,
    components: &Components,
    pipeline_config: &PipelineConfig,
) -> ChartResult<ChartScene> {
    pipeline_config.validate()?;
    let bounds = ChartBounds::new(pipeline_config.viewport, pipeline_config.margins)?;
    let chart_type = config.chart_type();
    let font_size = pipeline_config.font_size_px;

    let vars = match bind_variables(config, components) {
        Ok(vars) => vars,
        Err(ChartError::UnsupportedCombination(reason)) => {
            warn!(
                chart_type = ?chart_type,
                reason = %reason,
                "chart configuration cannot be drawn"
            );
            return Ok(ChartScene::with_hint(chart_type, bounds, font_size, reason));
        }
        Err(err) => return Err(err),
    };

    let imputed = match &vars {
        ChartVariables::Line(line) | ChartVariables::Area(line) => Some(impute_observations(
            &inputs.observations,
            &line.x.accessor,
            &line.y.accessor,
            line.segment.as_ref().map(|segment| &segment.accessor),
            line.y.imputation,
        )),
        _ => None,
    };
    let source = imputed.as_deref().unwrap_or(inputs.observations.as_slice());
    let all_rows = prepare(source, &vars.required_measures());

    let (animation, rows) = match vars.animation() {
        Some(variable) => {
            let frames = animation_frames(variable, &all_rows);
            let requested = inputs.active_frame.as_ref();
            let active = match requested {
                Some(frame) if frames.contains(frame) => Some(frame.clone()),
                Some(frame) => {
                    warn!(frame = %frame, "unknown animation frame, showing the first one");
                    frames.first().cloned()
                }
                None => frames.first().cloned(),
            };
            let rows: Vec<Observation> = all_rows
                .iter()
                .filter(|row| variable.accessor.key(row) == active)
                .cloned()
                .collect();
            (AnimationFrames { frames, active }, rows)
        }
        None => (AnimationFrames::default(), all_rows.clone()),
    };

    let ctx = BuildContext {
        bounds,
        config: pipeline_config,
        all_rows: &all_rows,
        rows: &rows,
        frame: animation.active.as_deref(),
        geo_features: &inputs.geo_features,
    };
    let mut scene = match &vars {
        ChartVariables::Column(band) => build_band_chart(band, BandOrientation::Vertical, &ctx)?,
        ChartVariables::Bar(band) => build_band_chart(band, BandOrientation::Horizontal, &ctx)?,
        ChartVariables::Line(line) => build_line_chart(line, &ctx)?,
        ChartVariables::Area(area) => build_area_chart(area, &ctx)?,
        ChartVariables::Pie(pie) => build_pie_chart(pie, &ctx)?,
        ChartVariables::Scatter(scatter) => build_scatter_chart(scatter, &ctx)?,
        ChartVariables::Table(table) => build_table(table, &ctx)?,
        ChartVariables::Map(map) => build_map_chart(map, &ctx)?,
        ChartVariables::ComboLineSingle(combo) => build_combo_single(combo, &ctx)?,
        ChartVariables::ComboLineDual(combo) => build_combo_dual(combo, &ctx)?,
        ChartVariables::ComboLineColumn(combo) => build_combo_line_column(combo, &ctx)?,
    };
    scene.animation = animation;

    debug!(
        chart_type = ?chart_type,
        observations = inputs.observations.len(),
        plottable = all_rows.len(),
        shown = rows.len(),
        data = scene.data.len(),
        "computed render data"
    );
    Ok(scene)
}

/// Revision counters of the pipeline inputs; the cache key of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputRevisions {
    pub data: u64,
    pub config: u64,
    pub pipeline_config: u64,
}

/// Stateful facade driving one chart instance.
pub struct ChartPipeline<R: Renderer> {
    renderer: R,
    engine: KeyedRenderEngine,
    interaction: InteractionController,
    inputs: ChartInputs,
    config: ChartConfig,
    components: Components,
    pipeline_config: PipelineConfig,
    revisions: InputRevisions,
    cache: Option<(InputRevisions, ChartScene)>,
}

impl<R: Renderer> ChartPipeline<R> {
    pub fn new(
        renderer: R,
        config: ChartConfig,
        components: Components,
        pipeline_config: PipelineConfig,
    ) -> ChartResult<Self> {
        pipeline_config.validate()?;
        Ok(Self {
            renderer,
            engine: KeyedRenderEngine::new(pipeline_config.viewport),
            interaction: InteractionController::new(),
            inputs: ChartInputs::default(),
            config,
            components,
            pipeline_config,
            revisions: InputRevisions::default(),
            cache: None,
        })
    }

    pub fn set_inputs(&mut self, inputs: ChartInputs) {
        self.inputs = inputs;
        self.revisions.data += 1;
    }

    pub fn set_observations(&mut self, observations: Vec<Observation>) {
        self.inputs.observations = observations;
        self.revisions.data += 1;
    }

    pub fn set_active_frame(&mut self, frame: Option<String>) {
        if self.inputs.active_frame != frame {
            self.inputs.active_frame = frame;
            self.revisions.data += 1;
        }
    }

    pub fn set_config(&mut self, config: ChartConfig, components: Components) {
        self.config = config;
        self.components = components;
        self.revisions.config += 1;
    }

    /// Replaces the layout configuration; a new viewport resets the engine's history.
    pub fn set_pipeline_config(&mut self, pipeline_config: PipelineConfig) -> ChartResult<()> {
        pipeline_config.validate()?;
        if pipeline_config.viewport != self.pipeline_config.viewport {
            self.engine = KeyedRenderEngine::new(pipeline_config.viewport);
        }
        self.pipeline_config = pipeline_config;
        self.revisions.pipeline_config += 1;
        Ok(())
    }

    #[must_use]
    pub fn revisions(&self) -> InputRevisions {
        self.revisions
    }

    #[must_use]
    pub fn inputs(&self) -> &ChartInputs {
        &self.inputs
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn pipeline_config(&self) -> &PipelineConfig {
        &self.pipeline_config
    }

    /// Scene for the current inputs, recomputed only when a revision changed.
    pub fn scene(&mut self) -> ChartResult<&ChartScene> {
        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|(revisions, _)| *revisions == self.revisions);
        if !fresh {
            let scene = compute_render_data(
                &self.inputs,
                &self.config,
                &self.components,
                &self.pipeline_config,
            )?;
            self.cache = Some((self.revisions, scene));
        }
        match &self.cache {
            Some((_, scene)) => Ok(scene),
            None => Err(ChartError::InvalidData("render data cache is empty".to_owned())),
        }
    }

    /// Last computed scene, without recomputing.
    #[must_use]
    pub fn cached_scene(&self) -> Option<&ChartScene> {
        self.cache.as_ref().map(|(_, scene)| scene)
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Recomputes the scene if needed and starts the transitions towards it.
    pub fn update(&mut self) -> ChartResult<RenderDiff> {
        let transitions = self.pipeline_config.transitions;
        self.scene()?;
        let Some((_, scene)) = &self.cache else {
            return Ok(RenderDiff::default());
        };
        let diff = self.engine.apply(&scene.to_frame(), transitions);
        self.interaction
            .bind(scene.hit_tester.clone(), scene.observations.clone());
        debug!(
            entered = diff.entered.len(),
            updated = diff.updated.len(),
            exited = diff.exited.len(),
            "render engine updated"
        );
        Ok(diff)
    }

    /// Advances transitions by `dt_ms`; returns whether any are still running.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        self.engine.tick(dt_ms)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.engine.is_animating()
    }

    /// Frame as currently displayed, mid-transition geometry included.
    #[must_use]
    pub fn frame(&self) -> RenderFrame {
        self.engine.frame()
    }

    pub fn render(&mut self) -> ChartResult<()> {
        let frame = self.engine.frame();
        frame.validate()?;
        self.renderer.render(&frame)
    }

    #[must_use]
    pub fn engine(&self) -> &KeyedRenderEngine {
        &self.engine
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn add_listener(&mut self, listener: Box<dyn InteractionListener>) {
        self.interaction.add_listener(listener);
    }

    pub fn remove_listener(&mut self, id: &str) -> bool {
        self.interaction.remove_listener(id)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> &InteractionState {
        self.interaction.pointer_move(x, y)
    }

    pub fn pointer_leave(&mut self) -> &InteractionState {
        self.interaction.pointer_leave()
    }

    pub fn click(&mut self, x: f64, y: f64) -> &InteractionState {
        self.interaction.click(x, y)
    }

    pub fn dismiss(&mut self) {
        self.interaction.dismiss();
    }

    #[must_use]
    pub fn interaction_state(&self) -> &InteractionState {
        self.interaction.state()
    }

    /// Tooltip or annotation content for the current interaction state.
    #[must_use]
    pub fn tooltip(&self) -> Option<TooltipContent> {
        let scene = self.cached_scene()?;
        TooltipContent::from_state(scene, self.interaction.state())
    }
}
