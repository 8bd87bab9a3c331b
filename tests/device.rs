extern crate env_logger;
extern crate pastel;

use std::rc::Rc;

use pastel::math::{Rect, Vector2};
use pastel::video::prelude::*;
use pastel::window::{HeadlessWindow, Window};

fn headless() -> (Device, HeadlessInspector, Rc<HeadlessWindow>) {
    let _ = env_logger::try_init();

    let window = Rc::new(HeadlessWindow::new(Vector2::new(320, 240)));
    let (device, inspector) = Device::headless(window.clone());
    (device, inspector, window)
}

fn pipeline(device: &mut Device, pass: RenderPassHandle) -> RenderPipelineHandle {
    let shader = device.create_shader(ShaderParams::default(), b"void main() {}");

    let mut params = RenderPipelineParams::new(pass, shader);
    params.layout = VertexLayout::new(16).with(0, "POSITION", 0, AttribType::Float4, 0);
    device.create_render_pipeline(params)
}

#[test]
fn buffer_growth() {
    let (mut device, inspector, _) = headless();

    let params = BufferParams::vertex(BufferUsage::Dynamic, 16);
    let vbo = device.create_buffer(params, None);
    assert_eq!(inspector.buffer_capacity(vbo), Some(16));

    device.update_buffer(vbo, &[1; 8]).unwrap();
    assert_eq!(inspector.buffer_allocations(vbo), Some(1));
    assert_eq!(&inspector.buffer_bytes(vbo).unwrap()[..8], &[1; 8]);

    device.update_buffer(vbo, &[2; 64]).unwrap();
    assert_eq!(inspector.buffer_allocations(vbo), Some(2));
    assert_eq!(inspector.buffer_bytes(vbo).unwrap(), vec![2; 64]);
    assert_eq!(device.buffer(vbo).unwrap().size, 64);

    // The handle survives the growth.
    device.update_buffer(vbo, &[3; 32]).unwrap();
    assert_eq!(inspector.buffer_allocations(vbo), Some(2));
    assert_eq!(&inspector.buffer_bytes(vbo).unwrap()[..32], &[3; 32][..]);
}

#[test]
fn immutable_buffer() {
    let (mut device, _, _) = headless();

    let params = BufferParams::element(BufferUsage::Static, 6);
    let ibo = device.create_buffer(params, Some(&[0, 0, 1, 0, 2, 0]));

    match device.update_buffer(ibo, &[0; 6]) {
        Err(VideoError::UpdateImmutableBuffer) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn double_free() {
    let (mut device, inspector, _) = headless();

    let vbo = device.create_buffer(BufferParams::vertex(BufferUsage::Stream, 4), None);
    let texture = device.create_texture(TextureParams::new(TextureFormat::R8, 2, 2), None);
    assert_eq!(inspector.live_buffers(), 1);
    assert_eq!(inspector.live_textures(), 1);

    device.delete_buffer(vbo);
    device.delete_buffer(vbo);
    device.delete_texture(texture);
    device.delete_texture(texture);

    assert_eq!(inspector.live_buffers(), 0);
    assert_eq!(inspector.live_textures(), 0);
    assert!(device.buffer(vbo).is_none());

    match device.update_buffer(vbo, &[0; 4]) {
        Err(VideoError::BufferHandleInvalid(v)) => assert_eq!(v, vbo),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn resize_texture() {
    let (mut device, inspector, _) = headless();

    let params = TextureParams::new(TextureFormat::RGBA8, 4, 4);
    let texture = device.create_texture(params, Some(&[255; 64]));
    assert_eq!(device.get_texture_size(texture), Some(Vector2::new(4, 4)));

    device.resize_texture(texture, 128, 32).unwrap();
    assert_eq!(device.get_texture_width(texture), Some(128));
    assert_eq!(device.get_texture_height(texture), Some(32));
    assert_eq!(inspector.texture_dimensions(texture), Some(Vector2::new(128, 32)));
    assert_eq!(device.texture(texture).unwrap().format, TextureFormat::RGBA8);

    device.delete_texture(texture);
    assert!(device.resize_texture(texture, 1, 1).is_err());
    assert_eq!(device.get_texture_width(texture), None);
}

#[test]
fn pass_nesting() {
    let (mut device, _, _) = headless();

    let pass = device.create_render_pass(RenderPassParams::default());
    let pipeline = pipeline(&mut device, pass);

    match device.bind_pipeline(pipeline) {
        Err(VideoError::PipelineOutsidePass) => {}
        other => panic!("unexpected {:?}", other),
    }

    match device.end_render_pass() {
        Err(VideoError::PassNotStarted) => {}
        other => panic!("unexpected {:?}", other),
    }

    device.begin_render_pass(pass).unwrap();
    assert_eq!(device.current_pass(), Some(pass));

    match device.begin_render_pass(pass) {
        Err(VideoError::PassAlreadyStarted) => {}
        other => panic!("unexpected {:?}", other),
    }

    match device.present() {
        Err(VideoError::PassAlreadyStarted) => {}
        other => panic!("unexpected {:?}", other),
    }

    device.end_render_pass().unwrap();
    assert_eq!(device.current_pass(), None);
}

#[test]
fn draw() {
    let (mut device, inspector, _) = headless();

    let pass = device.create_render_pass(RenderPassParams::default());
    let pipeline = pipeline(&mut device, pass);
    let vbo = device.create_buffer(BufferParams::vertex(BufferUsage::Dynamic, 48), None);
    let texture = device.create_texture(TextureParams::new(TextureFormat::RGBA8, 1, 1), None);
    let sampler = device.create_sampler(SamplerParams::default());

    device.begin_render_pass(pass).unwrap();

    match device.draw_arrays(3) {
        Err(VideoError::PipelineNotBound) => {}
        other => panic!("unexpected {:?}", other),
    }

    // Drawing nothing never fails.
    device.draw_arrays(0).unwrap();

    device.bind_pipeline(pipeline).unwrap();
    device.bind_buffer(vbo, 0).unwrap();
    device.bind_texture(texture, Some(sampler), 2).unwrap();
    device.draw_arrays(3).unwrap();

    match device.bind_texture(texture, None, 64) {
        Err(VideoError::InvalidSlot { slot: 64, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    device.end_render_pass().unwrap();

    let draws = inspector.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].pass, pass);
    assert_eq!(draws[0].pipeline, pipeline);
    assert_eq!(draws[0].mode, DrawMode::Triangles);
    assert_eq!(draws[0].count, 3);
    assert_eq!(draws[0].vertex_buffer, Some(vbo));
    assert_eq!(draws[0].textures, vec![(2, texture, Some(sampler))]);
}

#[test]
fn masked_bind_needs_vertex_buffer() {
    let (mut device, _, _) = headless();

    let pass = device.create_render_pass(RenderPassParams::default());
    let pipeline = pipeline(&mut device, pass);
    let ubo = device.create_buffer(BufferParams::uniform(BufferUsage::Dynamic, 64), None);
    let vbo = device.create_buffer(BufferParams::vertex(BufferUsage::Dynamic, 64), None);

    device.begin_render_pass(pass).unwrap();
    device.bind_pipeline(pipeline).unwrap();

    let mask = AttribMask::none().with(0);
    match device.bind_buffer_with_mask(ubo, 1, mask) {
        Err(VideoError::BufferTypeMismatch { expected, found }) => {
            assert_eq!(expected, BufferType::Vertex);
            assert_eq!(found, BufferType::Uniform);
        }
        other => panic!("unexpected {:?}", other),
    }

    device.bind_buffer_with_mask(vbo, 0, mask).unwrap();
    device.bind_buffer(ubo, 1).unwrap();
    device.end_render_pass().unwrap();
}

#[test]
fn draw_elements() {
    let (mut device, inspector, _) = headless();

    let pass = device.create_render_pass(RenderPassParams::default());
    let pipeline = pipeline(&mut device, pass);
    let vbo = device.create_buffer(BufferParams::vertex(BufferUsage::Static, 48), None);
    let ibo = device.create_buffer(BufferParams::element(BufferUsage::Static, 12), None);

    device.begin_render_pass(pass).unwrap();
    device.bind_pipeline(pipeline).unwrap();
    device.bind_buffer(vbo, 0).unwrap();
    device.bind_buffer(ibo, 0).unwrap();
    device.draw_elements(0, ElementType::UnsignedShort, 0).unwrap();
    device.draw_elements(6, ElementType::UnsignedShort, 0).unwrap();
    device.end_render_pass().unwrap();

    let draws = inspector.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].count, 6);
    assert_eq!(draws[0].elements, Some(ElementType::UnsignedShort));
}

#[test]
fn invalid_shader() {
    let (mut device, inspector, _) = headless();

    // The headless backend refuses empty sources.
    let shader = device.create_shader(ShaderParams::default(), b"");
    assert!(!device.is_shader_valid(shader));
    assert!(device.shader(shader).is_some());

    let pass = device.create_render_pass(RenderPassParams::default());
    let pipeline = device.create_render_pipeline(RenderPipelineParams::new(pass, shader));
    assert_eq!(inspector.pipelines_created(), 0);

    device.begin_render_pass(pass).unwrap();
    device.bind_pipeline(pipeline).unwrap();
    device.draw_arrays(3).unwrap();
    device.end_render_pass().unwrap();

    assert!(inspector.draws().is_empty());
}

#[test]
fn viewport_and_scissor() {
    let (mut device, inspector, _) = headless();

    device.set_viewport(Rect::new(0.0, 0.0, 160.0, 120.0)).unwrap();
    assert_eq!(inspector.viewport(), Rect::new(0.0, 0.0, 160.0, 120.0));

    device.begin_scissor(Rect::new(8.0, 8.0, 16.0, 16.0)).unwrap();
    assert_eq!(inspector.scissor(), Some(Rect::new(8.0, 8.0, 16.0, 16.0)));

    device.end_scissor().unwrap();
    assert_eq!(inspector.scissor(), None);
}

#[test]
fn frames() {
    let (mut device, inspector, window) = headless();
    assert_eq!(inspector.backbuffer(), Vector2::new(320, 240));

    assert!(!device.maybe_resize_backbuffer().unwrap());

    window.resize(Vector2::new(640, 480));
    assert!(device.maybe_resize_backbuffer().unwrap());
    assert_eq!(device.dimensions(), Vector2::new(640, 480));
    assert_eq!(inspector.backbuffer(), Vector2::new(640, 480));

    device.present().unwrap();
    device.present().unwrap();
    assert_eq!(inspector.frames(), 2);
    assert_eq!(window.swaps(), 2);
}

#[test]
fn shutdown() {
    let (mut device, inspector, _) = headless();

    let pass = device.create_render_pass(RenderPassParams::default());
    pipeline(&mut device, pass);
    device.create_buffer(BufferParams::uniform(BufferUsage::Dynamic, 64), None);
    device.create_texture(TextureParams::new(TextureFormat::D24S8, 8, 8), None);

    assert_eq!(inspector.live_passes(), 1);
    assert_eq!(inspector.live_pipelines(), 1);

    drop(device);

    assert_eq!(inspector.live_passes(), 0);
    assert_eq!(inspector.live_pipelines(), 0);
    assert_eq!(inspector.live_buffers(), 0);
    assert_eq!(inspector.live_textures(), 0);
}
