use approx::assert_relative_eq;
use obs_charts::core::Viewport;
use obs_charts::render::{
    Color, Easing, ElementPhase, KeyedRenderEngine, NullRenderer, Paint, Primitive, RenderFrame,
    Renderer, Shape, TransitionOptions,
};

fn viewport() -> Viewport {
    Viewport::new(200, 100)
}

fn column(key: &str, height: f64) -> Primitive {
    Primitive::new(
        key,
        "column",
        Shape::Rect {
            x: 10.0,
            y: 100.0 - height,
            width: 20.0,
            height,
        },
        Paint::fill(Color::NEUTRAL),
    )
}

fn slice(key: &str, end_angle: f64) -> Primitive {
    Primitive::new(
        key,
        "pie",
        Shape::Arc {
            start_angle: 0.0,
            end_angle,
            inner_radius: 0.0,
            outer_radius: 40.0,
            center_x: 100.0,
            center_y: 50.0,
        },
        Paint::fill(Color::NEUTRAL),
    )
}

fn frame(primitives: Vec<Primitive>) -> RenderFrame {
    let mut frame = RenderFrame::new(viewport());
    frame.extend(primitives);
    frame
}

fn linear(duration_ms: f64) -> TransitionOptions {
    TransitionOptions::default()
        .with_duration_ms(duration_ms)
        .with_easing(Easing::Linear)
}

fn rect_height(frame: &RenderFrame, key: &str) -> f64 {
    match frame.get(key).map(|primitive| &primitive.shape) {
        Some(Shape::Rect { height, .. }) => *height,
        other => panic!("expected rect for {key}, got {other:?}"),
    }
}

#[test]
fn disabled_transitions_apply_target_geometry_immediately() {
    let mut engine = KeyedRenderEngine::new(viewport());
    let diff = engine.apply(&frame(vec![column("a", 40.0)]), TransitionOptions::disabled());
    assert_eq!(diff.entered, vec!["a".to_owned()]);
    assert!(!engine.is_animating());
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 40.0);

    let diff = engine.apply(&frame(vec![column("b", 10.0)]), TransitionOptions::disabled());
    assert_eq!(diff.entered, vec!["b".to_owned()]);
    assert_eq!(diff.exited, vec!["a".to_owned()]);
    assert!(engine.frame().get("a").is_none());
    assert_eq!(engine.tracked_keys(), 1);
}

#[test]
fn entering_elements_grow_from_their_collapsed_geometry() {
    let mut engine = KeyedRenderEngine::new(viewport());
    engine.apply(&frame(vec![column("a", 40.0)]), linear(100.0));
    assert_eq!(engine.phase("a"), Some(ElementPhase::Entering));
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 0.0);

    assert!(engine.tick(50.0));
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 20.0, epsilon = 1e-9);

    assert!(!engine.tick(50.0));
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 40.0);
    assert_eq!(engine.phase("a"), Some(ElementPhase::Present));
}

#[test]
fn updates_retarget_from_the_geometry_currently_shown() {
    let mut engine = KeyedRenderEngine::new(viewport());
    engine.apply(&frame(vec![column("a", 40.0)]), linear(100.0));
    engine.tick(50.0);

    let diff = engine.apply(&frame(vec![column("a", 80.0)]), linear(100.0));
    assert_eq!(diff.updated, vec!["a".to_owned()]);
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 20.0, epsilon = 1e-9);

    engine.tick(50.0);
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 50.0, epsilon = 1e-9);
    engine.tick(50.0);
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 80.0);
}

#[test]
fn arcs_interpolate_from_the_remembered_previous_arc() {
    let mut engine = KeyedRenderEngine::new(viewport());
    engine.apply(&frame(vec![slice("pie:a", 1.0)]), TransitionOptions::disabled());
    engine.apply(&frame(vec![slice("pie:a", 3.0)]), linear(100.0));
    engine.tick(50.0);

    match engine.previous_geometry("pie:a") {
        Some(Shape::Arc { end_angle, .. }) => assert_relative_eq!(*end_angle, 2.0, epsilon = 1e-9),
        other => panic!("expected arc, got {other:?}"),
    }
}

#[test]
fn exiting_elements_stay_visible_until_their_transition_ends() {
    let mut engine = KeyedRenderEngine::new(viewport());
    engine.apply(&frame(vec![column("a", 40.0), column("b", 20.0)]), TransitionOptions::disabled());

    let diff = engine.apply(&frame(vec![column("b", 20.0)]), linear(100.0));
    assert_eq!(diff.exited, vec!["a".to_owned()]);
    assert_eq!(engine.phase("a"), Some(ElementPhase::Exiting));

    engine.tick(50.0);
    assert_relative_eq!(rect_height(&engine.frame(), "a"), 20.0, epsilon = 1e-9);
    engine.tick(50.0);
    assert!(engine.frame().get("a").is_none());
    assert!(engine.previous_geometry("a").is_none());

    engine.apply(&frame(vec![column("a", 40.0), column("b", 20.0)]), linear(100.0));
    assert_eq!(engine.phase("a"), Some(ElementPhase::Entering));
}

#[test]
fn null_renderer_counts_exportable_primitives() {
    let mut renderer = NullRenderer::default();
    let frame = frame(vec![
        column("a", 40.0),
        Primitive::new(
            "hover:a",
            "hover-band",
            Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: 40.0,
                height: 100.0,
            },
            Paint::fill(Color::TRANSPARENT),
        )
        .excluded_from_export(),
    ]);
    renderer.render(&frame).expect("render");
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_primitive_count, 2);
    assert_eq!(renderer.last_exportable_count, 1);
}

#[test]
fn invalid_geometry_is_rejected_before_rendering() {
    let mut renderer = NullRenderer::default();
    let frame = frame(vec![column("a", f64::NAN)]);
    assert!(renderer.render(&frame).is_err());
    assert_eq!(renderer.frames_rendered, 0);
}
