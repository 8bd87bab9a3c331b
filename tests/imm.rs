extern crate env_logger;
extern crate pastel;

use std::rc::Rc;

use pastel::imm::*;
use pastel::math::{Color, Matrix4, Rect, SquareMatrix, Vector2, Vector3};
use pastel::video::prelude::*;
use pastel::window::{HeadlessWindow, Window};

fn imm_with(params: ImmParams) -> (ImmContext, HeadlessInspector) {
    let _ = env_logger::try_init();

    let window = Rc::new(HeadlessWindow::new(Vector2::new(320, 240)));
    let (device, inspector) = Device::headless(window);
    (ImmContext::new(device, params), inspector)
}

fn imm() -> (ImmContext, HeadlessInspector) {
    imm_with(ImmParams::default())
}

fn triangle(imm: &mut ImmContext) {
    imm.imm_begin(DrawMode::Triangles).unwrap();
    imm.imm_position(0.0, 0.0, 0.0, 1.0).unwrap();
    imm.imm_position(8.0, 0.0, 0.0, 1.0).unwrap();
    imm.imm_position(0.0, 8.0, 0.0, 1.0).unwrap();
    imm.imm_end().unwrap();
}

fn texture(imm: &mut ImmContext, w: u32, h: u32) -> TextureHandle {
    let params = TextureParams::new(TextureFormat::RGBA8, w, h);
    imm.device_mut().create_texture(params, None)
}

fn use_texture_flag(imm: &ImmContext, inspector: &HeadlessInspector) -> f32 {
    let ubo = imm.uniform_buffer(0).unwrap();
    let bytes = inspector.buffer_bytes(ubo).unwrap();
    let mut v = [0u8; 4];
    v.copy_from_slice(&bytes[192..196]);
    f32::from_bits(u32::from_le_bytes(v))
}

fn near(v: [f32; 4], x: f32, y: f32) -> bool {
    (v[0] - x).abs() < 1e-3 && (v[1] - y).abs() < 1e-3
}

#[test]
fn rebuild_laziness() {
    let (mut imm, inspector) = imm();

    triangle(&mut imm);
    assert_eq!(imm.stats().pass_rebuilds, 1);
    assert_eq!(imm.stats().pipeline_rebuilds, 1);

    triangle(&mut imm);
    triangle(&mut imm);
    assert_eq!(imm.stats().pass_rebuilds, 1);
    assert_eq!(imm.stats().pipeline_rebuilds, 1);
    assert_eq!(imm.stats().draws, 3);
    assert_eq!(inspector.passes_created(), 1);
    assert_eq!(inspector.pipelines_created(), 1);
    assert_eq!(inspector.draws().len(), 3);
}

#[test]
fn color_target_rebuilds_pass_and_pipeline() {
    let (mut imm, inspector) = imm();
    let target = texture(&mut imm, 64, 64);

    triangle(&mut imm);
    let before = imm.stats();

    imm.imm_set_color_target(Some(target));
    triangle(&mut imm);

    let after = imm.stats();
    assert_eq!(after.pass_rebuilds, before.pass_rebuilds + 1);
    assert_eq!(after.pipeline_rebuilds, before.pipeline_rebuilds + 1);

    // Old objects are released.
    assert_eq!(inspector.live_passes(), 1);
    assert_eq!(inspector.live_pipelines(), 1);

    let pass = inspector.render_pass(imm.render_pass().unwrap()).unwrap();
    assert_eq!(pass.colors[0], RenderTarget::Texture(target));

    // Setting the same target again changes nothing.
    imm.imm_set_color_target(Some(target));
    triangle(&mut imm);
    assert_eq!(imm.stats().pass_rebuilds, after.pass_rebuilds);
}

#[test]
fn pipeline_only_rebuilds() {
    let (mut imm, _) = imm();
    triangle(&mut imm);

    let shader = imm
        .device_mut()
        .create_shader(ShaderParams::default(), b"void main() {}");
    imm.imm_set_shader(Some(shader)).unwrap();
    triangle(&mut imm);
    assert_eq!(imm.stats().pass_rebuilds, 1);
    assert_eq!(imm.stats().pipeline_rebuilds, 2);

    imm.imm_set_depth_read(true).unwrap();
    imm.imm_set_depth_write(true).unwrap();
    triangle(&mut imm);
    assert_eq!(imm.stats().pass_rebuilds, 1);
    assert_eq!(imm.stats().pipeline_rebuilds, 3);

    imm.imm_begin(DrawMode::Lines).unwrap();
    imm.imm_end().unwrap();
    assert_eq!(imm.stats().pass_rebuilds, 1);
    assert_eq!(imm.stats().pipeline_rebuilds, 4);

    let pipeline = imm
        .device()
        .render_pipeline(imm.render_pipeline().unwrap())
        .unwrap();
    assert_eq!(pipeline.shader, shader);
    assert_eq!(pipeline.draw_mode, DrawMode::Lines);
    assert_eq!(pipeline.blend, BlendMode::Alpha);
    assert_eq!(pipeline.cull, CullFace::None);
    assert!(pipeline.depth_read);
    assert!(pipeline.depth_write);
}

#[test]
fn no_texture_draw() {
    let (mut imm, inspector) = imm();
    let t0 = texture(&mut imm, 4, 4);
    let t3 = texture(&mut imm, 4, 4);

    imm.imm_set_texture(Some(t0), 0).unwrap();
    imm.imm_set_texture(Some(t3), 3).unwrap();
    triangle(&mut imm);

    let draw = inspector.last_draw().unwrap();
    assert!(draw.textures.is_empty());
    assert_eq!(use_texture_flag(&imm, &inspector), 0.0);

    // Only positions were pushed.
    assert!(draw.mask.contains(0));
    assert!(!draw.mask.contains(2));
    assert!(!draw.mask.contains(3));
}

#[test]
fn texture_draw() {
    let (mut imm, inspector) = imm();
    let t0 = texture(&mut imm, 4, 4);
    let t3 = texture(&mut imm, 4, 4);
    let linear = imm.imm_get_def_sampler(ImmSampler::RepeatLinear);

    imm.imm_set_texture(Some(t0), 0).unwrap();
    imm.imm_set_texture(Some(t3), 3).unwrap();
    imm.imm_set_sampler(Some(linear), 3).unwrap();

    imm.imm_begin(DrawMode::Points).unwrap();
    imm.imm_position(1.0, 1.0, 0.0, 1.0).unwrap();
    imm.imm_texcoord(0.5, 0.5, 0.0, 0.0).unwrap();
    imm.imm_color(1.0, 0.0, 0.0, 1.0).unwrap();
    imm.imm_end().unwrap();

    let draw = inspector.last_draw().unwrap();
    let nearest = imm.imm_get_def_sampler(ImmSampler::ClampNearest);
    assert_eq!(draw.textures.len(), 2);
    assert!(draw.textures.contains(&(0, t0, Some(nearest))));
    assert!(draw.textures.contains(&(3, t3, Some(linear))));
    assert_eq!(use_texture_flag(&imm, &inspector), 1.0);

    assert!(draw.mask.contains(0));
    assert!(draw.mask.contains(2));
    assert!(draw.mask.contains(3));
    assert!(!draw.mask.contains(1));

    // Unset sampler slots are not touched.
    assert_eq!(imm.imm_get_sampler(0), None);
}

#[test]
fn running_counts() {
    let (mut imm, inspector) = imm();

    imm.imm_begin(DrawMode::Lines).unwrap();
    imm.imm_color(1.0, 0.0, 0.0, 1.0).unwrap();
    imm.imm_color(0.0, 1.0, 0.0, 1.0).unwrap();
    imm.imm_position(1.0, 2.0, 0.0, 1.0).unwrap();
    imm.imm_position(3.0, 4.0, 0.0, 1.0).unwrap();
    imm.imm_userdata2(9.0, 0.0, 0.0, 0.0).unwrap();

    assert_eq!(imm.imm_count(ImmAttrib::Position), 2);
    assert_eq!(imm.imm_count(ImmAttrib::Color), 2);
    assert_eq!(imm.imm_count(ImmAttrib::Userdata2), 1);
    imm.imm_end().unwrap();

    assert_eq!(imm.imm_vertex(0).unwrap().color, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(imm.imm_vertex(1).unwrap().position, [3.0, 4.0, 0.0, 1.0]);
    assert_eq!(imm.imm_vertex(0).unwrap().userdata2, [9.0, 0.0, 0.0, 0.0]);

    let draw = inspector.last_draw().unwrap();
    assert_eq!(draw.count, 2);
    assert!(draw.mask.contains(6));
    assert!(!draw.mask.contains(4));

    let bytes = inspector.buffer_bytes(imm.vertex_buffer()).unwrap();
    assert_eq!(bytes.len(), ImmParams::default().max_vertices * 128);
}

#[test]
fn preconditions() {
    let (mut imm, _) = imm();

    match imm.imm_end() {
        Err(VideoError::NotDrawing) => {}
        other => panic!("unexpected {:?}", other),
    }

    match imm.imm_position(0.0, 0.0, 0.0, 1.0) {
        Err(VideoError::NotDrawing) => {}
        other => panic!("unexpected {:?}", other),
    }

    match imm.imm_texture_batched(0.0, 0.0, None, Color::white()) {
        Err(VideoError::NoTextureBatch) => {}
        other => panic!("unexpected {:?}", other),
    }

    match imm.imm_end_texture_batch() {
        Err(VideoError::NoTextureBatch) => {}
        other => panic!("unexpected {:?}", other),
    }

    imm.imm_begin(DrawMode::Triangles).unwrap();

    match imm.imm_begin(DrawMode::Triangles) {
        Err(VideoError::AlreadyDrawing) => {}
        other => panic!("unexpected {:?}", other),
    }

    match imm.imm_set_shader(None) {
        Err(VideoError::ShaderLocked(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    match imm.imm_set_depth_write(true) {
        Err(VideoError::ShaderLocked(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    // A plain draw is not a texture batch.
    match imm.imm_texture_batched(0.0, 0.0, None, Color::white()) {
        Err(VideoError::NoTextureBatch) => {}
        other => panic!("unexpected {:?}", other),
    }

    imm.imm_end().unwrap();
    assert!(!imm.is_drawing());
    assert!(!imm.imm_get_depth_write());
}

#[test]
fn slots() {
    let (mut imm, _) = imm();

    match imm.imm_set_texture(None, IMM_MAX_TEXTURES) {
        Err(VideoError::InvalidSlot { slot, max }) => {
            assert_eq!(slot, IMM_MAX_TEXTURES);
            assert_eq!(max, IMM_MAX_TEXTURES);
        }
        other => panic!("unexpected {:?}", other),
    }

    assert!(imm.imm_set_sampler(None, IMM_MAX_TEXTURES).is_err());
    assert!(imm.set_uniforms(Some(&[0; 4]), 0).is_err());
    assert!(imm.set_uniforms(Some(&[0; 4]), IMM_MAX_UNIFORMS).is_err());
    assert_eq!(imm.imm_get_texture(IMM_MAX_TEXTURES), None);
}

#[test]
fn capacity() {
    let params = ImmParams {
        max_vertices: 4,
        ..ImmParams::default()
    };

    let (mut imm, inspector) = imm_with(params);

    imm.imm_begin(DrawMode::Points).unwrap();
    for i in 0..4 {
        imm.imm_position(i as f32, 0.0, 0.0, 1.0).unwrap();
    }

    match imm.imm_position(4.0, 0.0, 0.0, 1.0) {
        Err(VideoError::CapacityExceeded { capacity }) => assert_eq!(capacity, 4),
        other => panic!("unexpected {:?}", other),
    }

    imm.imm_end().unwrap();
    assert_eq!(inspector.last_draw().unwrap().count, 4);
}

#[test]
fn helper_capacity_leaves_context_usable() {
    let params = ImmParams {
        max_vertices: 8,
        ..ImmParams::default()
    };

    let (mut imm, inspector) = imm_with(params);

    match imm.imm_circle_filled(0.0, 0.0, 10.0, 16, Color::white()) {
        Err(VideoError::CapacityExceeded { capacity }) => assert_eq!(capacity, 8),
        other => panic!("unexpected {:?}", other),
    }

    assert!(!imm.is_drawing());
    assert!(inspector.draws().is_empty());

    imm.imm_point(1.0, 1.0, Color::white()).unwrap();
    imm.imm_reset().unwrap();
    assert_eq!(inspector.draws().len(), 1);
}

#[test]
fn texture_batch_capacity() {
    let params = ImmParams {
        max_vertices: 8,
        ..ImmParams::default()
    };

    let (mut imm, inspector) = imm_with(params);
    let sprite = texture(&mut imm, 16, 16);

    imm.imm_begin_texture_batch(sprite).unwrap();
    imm.imm_texture_batched(8.0, 8.0, None, Color::white())
        .unwrap();

    match imm.imm_texture_batched(24.0, 8.0, None, Color::white()) {
        Err(VideoError::CapacityExceeded { .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    // Nothing of the rejected quad was written.
    assert_eq!(imm.imm_count(ImmAttrib::Position), 6);
    assert_eq!(imm.imm_count(ImmAttrib::Texcoord), 6);

    imm.imm_end_texture_batch().unwrap();
    assert_eq!(inspector.last_draw().unwrap().count, 6);
}

#[test]
fn custom_uniforms() {
    let (mut imm, inspector) = imm();

    let blob = [1u8, 2, 3, 4, 5, 6, 7, 8];
    imm.set_uniforms(Some(&blob), 2).unwrap();
    assert_eq!(imm.get_uniforms(2), Some(&blob[..]));

    triangle(&mut imm);

    let ubo = imm.uniform_buffer(2).unwrap();
    let draw = inspector.last_draw().unwrap();
    assert!(draw.uniforms.contains(&(2, ubo)));
    assert!(draw.uniforms.contains(&(0, imm.uniform_buffer(0).unwrap())));
    assert_eq!(&inspector.buffer_bytes(ubo).unwrap()[..8], &blob[..]);
    assert_eq!(inspector.buffer_capacity(ubo), Some(4096));

    imm.set_uniforms(None, 2).unwrap();
    triangle(&mut imm);
    assert_eq!(inspector.last_draw().unwrap().uniforms.len(), 1);
}

#[test]
fn circle_outline() {
    let (mut imm, inspector) = imm();

    imm.imm_circle_outline(0.0, 0.0, 10.0, 4, Color::white())
        .unwrap();

    let draw = inspector.last_draw().unwrap();
    assert_eq!(draw.mode, DrawMode::LineStrip);
    assert_eq!(draw.count, 5);

    let expected = [(10.0, 0.0), (0.0, 10.0), (-10.0, 0.0), (0.0, -10.0), (10.0, 0.0)];
    for (i, e) in expected.iter().enumerate() {
        let v = imm.imm_vertex(i).unwrap();
        assert!(near(v.position, e.0, e.1), "{:?} != {:?}", v.position, e);
    }
}

#[test]
fn circle_filled() {
    let (mut imm, inspector) = imm();

    imm.imm_circle_filled(50.0, 50.0, 10.0, 4, Color::red())
        .unwrap();

    let draw = inspector.last_draw().unwrap();
    assert_eq!(draw.mode, DrawMode::Triangles);
    assert_eq!(draw.count, 12);

    assert!(near(imm.imm_vertex(0).unwrap().position, 60.0, 50.0));
    assert!(near(imm.imm_vertex(1).unwrap().position, 50.0, 50.0));
    assert!(near(imm.imm_vertex(2).unwrap().position, 50.0, 60.0));
    assert!(near(imm.imm_vertex(11).unwrap().position, 60.0, 50.0));
    assert_eq!(imm.imm_vertex(4).unwrap().color, [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn primitives() {
    let (mut imm, inspector) = imm();

    imm.imm_point(1.0, 1.0, Color::white()).unwrap();
    imm.imm_line(0.0, 0.0, 10.0, 10.0, Color::white()).unwrap();
    imm.imm_rect_outline(0.0, 0.0, 10.0, 10.0, Color::white())
        .unwrap();
    imm.imm_rect_filled(10.0, 20.0, 30.0, 40.0, Color::white())
        .unwrap();

    let draws = inspector.draws();
    let modes: Vec<_> = draws.iter().map(|v| (v.mode, v.count)).collect();
    assert_eq!(
        modes,
        vec![
            (DrawMode::Points, 1),
            (DrawMode::Lines, 2),
            (DrawMode::LineStrip, 5),
            (DrawMode::TriangleStrip, 4),
        ]
    );

    assert!(near(imm.imm_vertex(0).unwrap().position, 10.0, 60.0));
    assert!(near(imm.imm_vertex(1).unwrap().position, 10.0, 20.0));
    assert!(near(imm.imm_vertex(2).unwrap().position, 40.0, 60.0));
    assert!(near(imm.imm_vertex(3).unwrap().position, 40.0, 20.0));
}

#[test]
fn rect_outline_extents() {
    let (mut imm, inspector) = imm();

    imm.imm_rect_outline(10.0, 20.0, 30.0, 40.0, Color::white())
        .unwrap();
    assert_eq!(inspector.last_draw().unwrap().count, 5);

    let expected = [(10.5, 20.5), (40.5, 20.5), (40.5, 60.5), (10.5, 60.5), (10.5, 20.5)];
    for (i, e) in expected.iter().enumerate() {
        let v = imm.imm_vertex(i).unwrap();
        assert!(near(v.position, e.0, e.1), "{:?} != {:?}", v.position, e);
    }
}

#[test]
fn texture_quad() {
    let (mut imm, inspector) = imm();
    let sprite = texture(&mut imm, 50, 50);

    imm.imm_texture_ex(sprite, 100.0, 100.0, 1.0, 1.0, 0.0, None, None, Color::white())
        .unwrap();

    let draw = inspector.last_draw().unwrap();
    assert_eq!(draw.mode, DrawMode::TriangleStrip);
    assert_eq!(draw.count, 4);
    assert_eq!(draw.textures.len(), 1);

    let positions: Vec<_> = (0..4).map(|i| imm.imm_vertex(i).unwrap().position).collect();
    assert!(near(positions[0], 75.0, 125.0));
    assert!(near(positions[1], 75.0, 75.0));
    assert!(near(positions[2], 125.0, 125.0));
    assert!(near(positions[3], 125.0, 75.0));

    assert_eq!(imm.imm_vertex(1).unwrap().texcoord, [0.0, 0.0, 0.0, 0.0]);
    assert_eq!(imm.imm_vertex(2).unwrap().texcoord, [1.0, 1.0, 0.0, 0.0]);
    assert_eq!(imm.imm_get_model(), Matrix4::identity());

    let clip = ImmClip::new(0.0, 0.0, 25.0, 50.0);
    imm.imm_texture(sprite, 0.0, 0.0, Some(clip), Color::white())
        .unwrap();
    assert!(near(imm.imm_vertex(1).unwrap().position, -12.5, -25.0));
    assert_eq!(imm.imm_vertex(3).unwrap().texcoord, [0.5, 0.0, 0.0, 0.0]);
}

#[test]
fn texture_quad_under_model() {
    let (mut imm, inspector) = imm();
    let sprite = texture(&mut imm, 50, 50);

    let model = Matrix4::from_translation(Vector3::new(5.0, 7.0, 0.0));
    imm.imm_set_model(model);
    imm.imm_texture_ex(sprite, 100.0, 100.0, 2.0, 2.0, 0.0, None, None, Color::white())
        .unwrap();

    // Corners carry the quad transform only.
    assert!(near(imm.imm_vertex(1).unwrap().position, 50.0, 50.0));
    assert!(near(imm.imm_vertex(2).unwrap().position, 150.0, 150.0));
    assert_eq!(imm.imm_get_model(), model);

    // The model matrix is still uploaded for the shader.
    let ubo = imm.uniform_buffer(0).unwrap();
    let bytes = inspector.buffer_bytes(ubo).unwrap();
    let column = |i: usize| {
        let mut v = [0u8; 4];
        v.copy_from_slice(&bytes[176 + i * 4..180 + i * 4]);
        f32::from_bits(u32::from_le_bytes(v))
    };
    assert_eq!([column(0), column(1), column(2), column(3)], [5.0, 7.0, 0.0, 1.0]);
}

#[test]
fn texture_batch() {
    let (mut imm, inspector) = imm();
    let sprite = texture(&mut imm, 16, 16);

    imm.imm_begin_texture_batch(sprite).unwrap();
    imm.imm_texture_batched(8.0, 8.0, None, Color::white())
        .unwrap();
    imm.imm_texture_batched_ex(32.0, 8.0, 2.0, 2.0, 0.0, None, None, Color::white())
        .unwrap();
    imm.imm_end_texture_batch().unwrap();

    let draws = inspector.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].mode, DrawMode::Triangles);
    assert_eq!(draws[0].count, 12);
    assert_eq!(draws[0].textures[0].1, sprite);

    // BL, TL, TR, TR, BR, BL.
    let expected = [(0.0, 16.0), (0.0, 0.0), (16.0, 0.0), (16.0, 0.0), (16.0, 16.0), (0.0, 16.0)];
    for (i, e) in expected.iter().enumerate() {
        assert!(near(imm.imm_vertex(i).unwrap().position, e.0, e.1));
    }

    // Scaled around the center.
    assert!(near(imm.imm_vertex(7).unwrap().position, 16.0, -8.0));
    assert!(near(imm.imm_vertex(10).unwrap().position, 48.0, 24.0));

    match imm.imm_texture_batched(0.0, 0.0, None, Color::white()) {
        Err(VideoError::NoTextureBatch) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn clear() {
    let (mut imm, inspector) = imm();

    imm.imm_clear(Color::red()).unwrap();
    let pass = inspector.render_pass(imm.render_pass().unwrap()).unwrap();
    assert!(pass.clear);
    assert_eq!(pass.clear_color, Color::red());
    assert!(inspector.draws().is_empty());

    triangle(&mut imm);
    let pass = inspector.render_pass(imm.render_pass().unwrap()).unwrap();
    assert!(!pass.clear);
    assert_eq!(imm.stats().pass_rebuilds, 2);
}

#[test]
fn reset() {
    let (mut imm, inspector) = imm();
    let target = texture(&mut imm, 8, 8);

    imm.imm_set_color_target(Some(target));
    imm.imm_set_texture(Some(target), 1).unwrap();
    imm.imm_set_viewport(Rect::new(1.0, 2.0, 3.0, 4.0));
    imm.imm_set_model(Matrix4::from_scale(2.0));
    imm.imm_set_depth_read(true).unwrap();
    imm.set_uniforms(Some(&[1, 2]), 1).unwrap();

    imm.imm_reset().unwrap();
    assert_eq!(imm.imm_get_color_target(), None);
    assert_eq!(imm.imm_get_texture(1), None);
    assert_eq!(imm.imm_get_shader(), None);
    assert_eq!(imm.get_uniforms(1), None);
    assert_eq!(imm.imm_get_viewport(), Rect::new(0.0, 0.0, 320.0, 240.0));
    assert_eq!(imm.imm_get_model(), Matrix4::identity());
    assert_eq!(imm.imm_get_view(), Matrix4::identity());
    assert_eq!(imm.imm_get_projection(), pastel::math::screen_ortho(320.0, 240.0));
    assert!(!imm.imm_get_depth_read());

    triangle(&mut imm);
    assert_eq!(inspector.viewport(), Rect::new(0.0, 0.0, 320.0, 240.0));
}

#[test]
fn invalid_shader_draws_nothing() {
    let (mut imm, inspector) = imm();

    let broken = imm.device_mut().create_shader(ShaderParams::default(), b"");
    imm.imm_set_shader(Some(broken)).unwrap();
    triangle(&mut imm);
    assert!(inspector.draws().is_empty());

    imm.imm_set_shader(None).unwrap();
    triangle(&mut imm);
    assert_eq!(inspector.draws().len(), 1);
}

#[test]
fn frames() {
    let (mut imm, inspector) = imm();

    for _ in 0..3 {
        imm.begin_frame().unwrap();
        imm.imm_clear(Color::black()).unwrap();
        triangle(&mut imm);
        imm.end_frame().unwrap();
    }

    assert_eq!(inspector.frames(), 3);
    assert_eq!(inspector.draws().len(), 3);

    imm.device().window().resize(Vector2::new(64, 32));
    imm.begin_frame().unwrap();
    assert_eq!(inspector.backbuffer(), Vector2::new(64, 32));
    assert_eq!(imm.imm_get_viewport(), Rect::new(0.0, 0.0, 64.0, 32.0));
}

#[test]
fn shutdown() {
    let (imm, inspector) = imm();
    assert!(inspector.live_buffers() > 0);

    drop(imm);
    assert_eq!(inspector.live_buffers(), 0);
    assert_eq!(inspector.live_passes(), 0);
}
