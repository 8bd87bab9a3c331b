extern crate pastel;

use std::rc::Rc;

use pastel::imm::*;
use pastel::math::Vector2;
use pastel::post_process::*;
use pastel::video::prelude::*;
use pastel::window::HeadlessWindow;

fn setup() -> (ImmContext, HeadlessInspector, PostProcessStack) {
    let window = Rc::new(HeadlessWindow::new(Vector2::new(320, 240)));
    let (device, inspector) = Device::headless(window);
    let mut imm = ImmContext::new(device, ImmParams::default());
    let stack = PostProcessStack::new(imm.device_mut());
    (imm, inspector, stack)
}

fn shader(imm: &mut ImmContext) -> ShaderHandle {
    let params = ShaderParams::default().with("u_texture", UniformType::Texture, 0);
    imm.device_mut().create_shader(params, b"void main() {}")
}

fn texture(imm: &mut ImmContext, w: u32, h: u32) -> TextureHandle {
    let params = TextureParams::new(TextureFormat::RGBA8, w, h);
    imm.device_mut().create_texture(params, None)
}

#[test]
fn stack() {
    let (mut imm, _, mut stack) = setup();
    let shader = shader(&mut imm);

    assert!(stack.is_empty());
    for i in 0..MAX_POST_EFFECTS {
        stack.push(PostEffect::new(format!("effect{}", i), shader)).unwrap();
    }

    assert_eq!(stack.len(), MAX_POST_EFFECTS);
    assert!(stack.push(PostEffect::new("overflow", shader)).is_err());
    assert_eq!(stack.len(), MAX_POST_EFFECTS);

    let last = stack.pop().unwrap();
    assert_eq!(last.name, format!("effect{}", MAX_POST_EFFECTS - 1));
    assert_eq!(stack.len(), MAX_POST_EFFECTS - 1);
    assert_eq!(stack.effects()[0].name, "effect0");

    stack.clear();
    assert!(stack.is_empty());
    assert!(stack.pop().is_none());
}

#[test]
fn passthrough() {
    let (mut imm, inspector, mut stack) = setup();
    let scene = texture(&mut imm, 320, 240);

    assert_eq!(stack.perform(&mut imm, scene).unwrap(), scene);
    assert!(inspector.draws().is_empty());
}

#[test]
fn ping_pong() {
    let (mut imm, inspector, mut stack) = setup();
    let scene = texture(&mut imm, 320, 240);
    let noise = texture(&mut imm, 16, 16);
    let (blur, tint) = (shader(&mut imm), shader(&mut imm));
    let [t0, t1] = stack.targets();

    stack
        .push(PostEffect::new("blur", blur).with_texture(0, noise, None))
        .unwrap();

    assert_eq!(stack.perform(&mut imm, scene).unwrap(), t1);

    stack
        .push(PostEffect::new("tint", tint).with_uniforms(&[7; 16]))
        .unwrap();

    inspector.clear_draws();
    assert_eq!(stack.perform(&mut imm, scene).unwrap(), t0);

    let draws = inspector.draws();
    assert_eq!(draws.len(), 3);

    let nearest = imm.imm_get_def_sampler(ImmSampler::ClampNearest);

    // The input is copied into the first target.
    assert_eq!(draws[0].target, RenderTarget::Texture(t0));
    assert_eq!(draws[0].textures, vec![(0, scene, Some(nearest))]);
    assert_eq!(draws[0].shader, imm.default_shader());

    assert_eq!(draws[1].target, RenderTarget::Texture(t1));
    assert_eq!(draws[1].shader, blur);
    assert!(draws[1].textures.contains(&(0, t0, Some(nearest))));
    assert!(draws[1].textures.contains(&(1, noise, Some(nearest))));
    assert_eq!(draws[1].uniforms.len(), 1);

    // Extra textures of the previous effect are gone.
    assert_eq!(draws[2].target, RenderTarget::Texture(t0));
    assert_eq!(draws[2].shader, tint);
    assert_eq!(draws[2].textures, vec![(0, t1, Some(nearest))]);

    let ubo = imm.uniform_buffer(1).unwrap();
    assert!(draws[2].uniforms.contains(&(1, ubo)));
    assert_eq!(&inspector.buffer_bytes(ubo).unwrap()[..16], &[7; 16][..]);

    for draw in &draws {
        assert_eq!(draw.mode, DrawMode::TriangleStrip);
        assert_eq!(draw.count, 4);
    }
}

#[test]
fn input_sampler() {
    let (mut imm, inspector, mut stack) = setup();
    let scene = texture(&mut imm, 320, 240);
    let shader = shader(&mut imm);
    let linear = imm.imm_get_def_sampler(ImmSampler::ClampLinear);

    stack
        .push(PostEffect::new("smooth", shader).with_input_sampler(linear))
        .unwrap();
    let output = stack.perform(&mut imm, scene).unwrap();

    let draw = inspector.last_draw().unwrap();
    assert_eq!(draw.textures, vec![(0, stack.targets()[0], Some(linear))]);
    assert_eq!(output, stack.targets()[1]);
}

#[test]
fn target_sizes() {
    let (mut imm, inspector, mut stack) = setup();
    let scene = texture(&mut imm, 100, 50);
    let shader = shader(&mut imm);
    let [t0, t1] = stack.targets();

    stack
        .push(PostEffect::new("downsample", shader).with_output(64, 32))
        .unwrap();
    stack.push(PostEffect::new("copy", shader)).unwrap();
    stack.perform(&mut imm, scene).unwrap();

    // The copy keeps the size of the input, the first effect writes at its own.
    assert_eq!(inspector.texture_dimensions(t1), Some(Vector2::new(64, 32)));
    assert_eq!(inspector.texture_dimensions(t0), Some(Vector2::new(100, 50)));

    let draws = inspector.draws();
    assert_eq!(draws.len(), 3);
    assert_eq!(imm.imm_get_viewport().w, 100.0);
    assert_eq!(imm.imm_vertex(3).unwrap().position, [100.0, 0.0, 0.0, 1.0]);
}

#[test]
fn invalid_input() {
    let (mut imm, _, mut stack) = setup();
    let scene = texture(&mut imm, 8, 8);
    imm.device_mut().delete_texture(scene);

    assert!(stack.perform(&mut imm, scene).is_err());
}

#[test]
fn destroy() {
    let (mut imm, inspector, stack) = setup();
    let live = inspector.live_textures();

    stack.destroy(imm.device_mut());
    assert_eq!(inspector.live_textures(), live - 2);
}
