use std::collections::HashMap;
use std::ffi::CString;
use std::mem;
use std::ops::Deref;
use std::os::raw::c_void;
use std::ptr;
use std::slice;

use winapi::shared::dxgi::{IDXGISwapChain, DXGI_SWAP_CHAIN_DESC, DXGI_SWAP_EFFECT_DISCARD};
use winapi::shared::dxgiformat::{DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_FORMAT_UNKNOWN};
use winapi::shared::dxgitype::{
    DXGI_MODE_DESC, DXGI_RATIONAL, DXGI_SAMPLE_DESC, DXGI_USAGE_RENDER_TARGET_OUTPUT,
};
use winapi::shared::minwindef::{FALSE, TRUE, UINT};
use winapi::shared::windef::HWND;
use winapi::shared::winerror::{HRESULT, SUCCEEDED};
use winapi::um::d3d11::*;
use winapi::um::d3dcommon::*;
use winapi::um::d3dcompiler::{D3DCompile, D3DCOMPILE_ENABLE_STRICTNESS};
use winapi::um::unknwnbase::IUnknown;
use winapi::Interface;

use crate::errors::*;
use crate::math::{Rect, Vector2};
use crate::video::MAX_TEXTURE_UNITS;
use crate::window::Window;

use super::super::super::assets::prelude::*;
use super::super::utils::DataVec;
use super::super::Visitor;
use super::types;

/// An owned reference to a COM object, released on drop.
struct ComPtr<T: Interface>(*mut T);

impl<T: Interface> ComPtr<T> {
    fn new(ptr: *mut T) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(ComPtr(ptr))
        }
    }

    #[inline]
    fn as_raw(&self) -> *mut T {
        self.0
    }
}

impl<T: Interface> Deref for ComPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.0 }
    }
}

impl<T: Interface> Drop for ComPtr<T> {
    fn drop(&mut self) {
        unsafe {
            (*(self.0 as *mut IUnknown)).Release();
        }
    }
}

fn check(hr: HRESULT, what: &str) -> Result<()> {
    if SUCCEEDED(hr) {
        Ok(())
    } else {
        bail!("[D3D11] Failed to {} (HRESULT 0x{:08X}).", what, hr as u32);
    }
}

fn out<T: Interface>(ptr: *mut T, what: &str) -> Result<ComPtr<T>> {
    ComPtr::new(ptr).ok_or_else(|| format_err!("[D3D11] Failed to {}.", what))
}

struct D3DBufferData {
    buffer: ComPtr<ID3D11Buffer>,
    params: BufferParams,
    capacity: usize,
}

struct D3DShaderData {
    vs: ComPtr<ID3D11VertexShader>,
    ps: ComPtr<ID3D11PixelShader>,
    bytecode: Vec<u8>,
}

struct D3DTextureData {
    texture: ComPtr<ID3D11Texture2D>,
    srv: Option<ComPtr<ID3D11ShaderResourceView>>,
    rtv: Option<ComPtr<ID3D11RenderTargetView>>,
    dsv: Option<ComPtr<ID3D11DepthStencilView>>,
    params: TextureParams,
}

struct D3DPipelineData {
    params: RenderPipelineParams,
    bytecode: Vec<u8>,
    semantics: Vec<CString>,
    blend: ComPtr<ID3D11BlendState>,
    depth: ComPtr<ID3D11DepthStencilState>,
    /// Rasterizer states without and with the scissor test.
    rasterizers: [ComPtr<ID3D11RasterizerState>; 2],
    /// Input layouts are created lazily for every attribute mask a draw asks for.
    layouts: HashMap<AttribMask, Option<ComPtr<ID3D11InputLayout>>>,
}

pub struct D3D11Visitor {
    device: ComPtr<ID3D11Device>,
    context: ComPtr<ID3D11DeviceContext>,
    swapchain: ComPtr<IDXGISwapChain>,
    backbuffer: Option<ComPtr<ID3D11RenderTargetView>>,
    pipeline: Option<RenderPipelineHandle>,
    index_buffer: Option<BufferHandle>,
    scissor: bool,
    buffers: DataVec<D3DBufferData>,
    shaders: DataVec<D3DShaderData>,
    samplers: DataVec<ComPtr<ID3D11SamplerState>>,
    textures: DataVec<D3DTextureData>,
    passes: DataVec<RenderPassParams>,
    pipelines: DataVec<D3DPipelineData>,
}

impl D3D11Visitor {
    pub unsafe fn new(window: &dyn Window) -> Result<Self> {
        let hwnd = window.native_handle() as HWND;
        if hwnd.is_null() {
            bail!("[D3D11] The window does not expose a native handle.");
        }

        let dimensions = window.dimensions();

        let mut desc: DXGI_SWAP_CHAIN_DESC = mem::zeroed();
        desc.BufferDesc = DXGI_MODE_DESC {
            Width: dimensions.x,
            Height: dimensions.y,
            RefreshRate: DXGI_RATIONAL {
                Numerator: 0,
                Denominator: 1,
            },
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            ScanlineOrdering: 0,
            Scaling: 0,
        };
        desc.SampleDesc = DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        };
        desc.BufferUsage = DXGI_USAGE_RENDER_TARGET_OUTPUT;
        desc.BufferCount = 1;
        desc.OutputWindow = hwnd;
        desc.Windowed = TRUE;
        desc.SwapEffect = DXGI_SWAP_EFFECT_DISCARD;

        let levels = [D3D_FEATURE_LEVEL_11_0, D3D_FEATURE_LEVEL_10_0];
        let mut swapchain = ptr::null_mut();
        let mut device = ptr::null_mut();
        let mut context = ptr::null_mut();
        let mut level = 0;

        let flags = if cfg!(debug_assertions) {
            D3D11_CREATE_DEVICE_DEBUG
        } else {
            0
        };

        check(
            D3D11CreateDeviceAndSwapChain(
                ptr::null_mut(),
                D3D_DRIVER_TYPE_HARDWARE,
                ptr::null_mut(),
                flags,
                levels.as_ptr(),
                levels.len() as UINT,
                D3D11_SDK_VERSION,
                &desc,
                &mut swapchain,
                &mut device,
                &mut level,
                &mut context,
            ),
            "create device and swap chain",
        )?;

        info!(
            "D3D11Visitor: feature level 0x{:X}, {}x{}.",
            level, dimensions.x, dimensions.y
        );

        let mut visitor = D3D11Visitor {
            device: out(device, "create device")?,
            context: out(context, "create device context")?,
            swapchain: out(swapchain, "create swap chain")?,
            backbuffer: None,
            pipeline: None,
            index_buffer: None,
            scissor: false,
            buffers: DataVec::new(),
            shaders: DataVec::new(),
            samplers: DataVec::new(),
            textures: DataVec::new(),
            passes: DataVec::new(),
            pipelines: DataVec::new(),
        };

        visitor.backbuffer = Some(visitor.create_backbuffer_view()?);
        Ok(visitor)
    }

    unsafe fn create_backbuffer_view(&self) -> Result<ComPtr<ID3D11RenderTargetView>> {
        let mut surface = ptr::null_mut();
        check(
            self.swapchain
                .GetBuffer(0, &ID3D11Texture2D::uuidof(), &mut surface),
            "get the swap chain buffer",
        )?;

        let surface = out(surface as *mut ID3D11Texture2D, "get the swap chain buffer")?;

        let mut rtv = ptr::null_mut();
        check(
            self.device.CreateRenderTargetView(
                surface.as_raw() as *mut ID3D11Resource,
                ptr::null(),
                &mut rtv,
            ),
            "create the backbuffer view",
        )?;

        out(rtv, "create the backbuffer view")
    }

    unsafe fn alloc_buffer(
        &self,
        params: &BufferParams,
        size: usize,
        data: Option<&[u8]>,
    ) -> Result<(ComPtr<ID3D11Buffer>, usize)> {
        let mut size = size.max(1);
        if params.typ == BufferType::Uniform {
            // Constant buffers are sized in multiples of 16 bytes.
            size = (size + 15) & !15;
        }

        let (usage, access) = types::usage(params.usage);
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: size as UINT,
            Usage: usage,
            BindFlags: types::bind_flags(params.typ),
            CPUAccessFlags: access,
            MiscFlags: 0,
            StructureByteStride: 0,
        };

        // Initial data must cover the whole buffer.
        let mut padded = Vec::new();
        let initial = match data {
            Some(v) if !v.is_empty() => {
                let bytes = if v.len() < size {
                    padded.extend_from_slice(v);
                    padded.resize(size, 0);
                    &padded[..]
                } else {
                    v
                };

                Some(D3D11_SUBRESOURCE_DATA {
                    pSysMem: bytes.as_ptr() as *const c_void,
                    SysMemPitch: 0,
                    SysMemSlicePitch: 0,
                })
            }
            _ => None,
        };

        let mut buffer = ptr::null_mut();
        check(
            self.device.CreateBuffer(
                &desc,
                initial.as_ref().map(|v| v as *const _).unwrap_or(ptr::null()),
                &mut buffer,
            ),
            "create buffer",
        )?;

        Ok((out(buffer, "create buffer")?, size))
    }

    unsafe fn alloc_texture(
        &self,
        params: &TextureParams,
        data: Option<&[u8]>,
    ) -> Result<D3DTextureData> {
        let depth = params.format.is_depth();
        let desc = D3D11_TEXTURE2D_DESC {
            Width: params.dimensions.x.max(1),
            Height: params.dimensions.y.max(1),
            MipLevels: 1,
            ArraySize: 1,
            Format: types::texture_format(params.format),
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: if depth {
                D3D11_BIND_DEPTH_STENCIL
            } else {
                D3D11_BIND_SHADER_RESOURCE | D3D11_BIND_RENDER_TARGET
            },
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };

        let initial = data.filter(|v| !v.is_empty()).map(|v| D3D11_SUBRESOURCE_DATA {
            pSysMem: v.as_ptr() as *const c_void,
            SysMemPitch: params.dimensions.x * params.format.bytes_per_pixel() as u32,
            SysMemSlicePitch: 0,
        });

        let mut texture = ptr::null_mut();
        check(
            self.device.CreateTexture2D(
                &desc,
                initial.as_ref().map(|v| v as *const _).unwrap_or(ptr::null()),
                &mut texture,
            ),
            "create texture",
        )?;

        let texture = out(texture, "create texture")?;
        let resource = texture.as_raw() as *mut ID3D11Resource;

        let mut data = D3DTextureData {
            texture,
            srv: None,
            rtv: None,
            dsv: None,
            params: *params,
        };

        if depth {
            let mut dsv = ptr::null_mut();
            check(
                self.device
                    .CreateDepthStencilView(resource, ptr::null(), &mut dsv),
                "create depth stencil view",
            )?;
            data.dsv = Some(out(dsv, "create depth stencil view")?);
        } else {
            let mut srv_desc: D3D11_SHADER_RESOURCE_VIEW_DESC = mem::zeroed();
            srv_desc.Format = desc.Format;
            srv_desc.ViewDimension = types::srv_dimension(params.typ);
            srv_desc.u.Texture2D_mut().MipLevels = 1;

            let mut srv = ptr::null_mut();
            check(
                self.device
                    .CreateShaderResourceView(resource, &srv_desc, &mut srv),
                "create shader resource view",
            )?;
            data.srv = Some(out(srv, "create shader resource view")?);

            let mut rtv = ptr::null_mut();
            check(
                self.device
                    .CreateRenderTargetView(resource, ptr::null(), &mut rtv),
                "create render target view",
            )?;
            data.rtv = Some(out(rtv, "create render target view")?);
        }

        Ok(data)
    }

    unsafe fn compile(source: &[u8], define: &str, entry: &str, target: &str) -> Result<Vec<u8>> {
        let define = CString::new(define)?;
        let one = CString::new("1")?;
        let entry = CString::new(entry)?;
        let target = CString::new(target)?;

        let macros = [
            D3D_SHADER_MACRO {
                Name: define.as_ptr(),
                Definition: one.as_ptr(),
            },
            D3D_SHADER_MACRO {
                Name: ptr::null(),
                Definition: ptr::null(),
            },
        ];

        let mut code: *mut ID3DBlob = ptr::null_mut();
        let mut errors: *mut ID3DBlob = ptr::null_mut();

        let hr = D3DCompile(
            source.as_ptr() as *const c_void,
            source.len(),
            ptr::null(),
            macros.as_ptr(),
            ptr::null_mut(),
            entry.as_ptr(),
            target.as_ptr(),
            D3DCOMPILE_ENABLE_STRICTNESS,
            0,
            &mut code,
            &mut errors,
        );

        let errors = ComPtr::new(errors).map(|v| Self::blob(&v));
        if !SUCCEEDED(hr) {
            let msg = errors
                .map(|v| String::from_utf8_lossy(&v).into_owned())
                .unwrap_or_default();
            bail!("[D3D11] Failed to compile {:?}:\n{}", define, msg);
        }

        let code = out(code, "compile shader")?;
        Ok(Self::blob(&code))
    }

    unsafe fn blob(blob: &ComPtr<ID3DBlob>) -> Vec<u8> {
        slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()).to_vec()
    }

    unsafe fn rasterizer(
        &self,
        cull: CullFace,
        scissor: bool,
    ) -> Result<ComPtr<ID3D11RasterizerState>> {
        let desc = D3D11_RASTERIZER_DESC {
            FillMode: D3D11_FILL_SOLID,
            CullMode: types::cull_mode(cull),
            // Matches the counter-clockwise front faces of GL.
            FrontCounterClockwise: TRUE,
            DepthBias: 0,
            DepthBiasClamp: 0.0,
            SlopeScaledDepthBias: 0.0,
            DepthClipEnable: TRUE,
            ScissorEnable: if scissor { TRUE } else { FALSE },
            MultisampleEnable: FALSE,
            AntialiasedLineEnable: FALSE,
        };

        let mut state = ptr::null_mut();
        check(
            self.device.CreateRasterizerState(&desc, &mut state),
            "create rasterizer state",
        )?;
        out(state, "create rasterizer state")
    }

    unsafe fn input_layout(
        device: &ComPtr<ID3D11Device>,
        pipeline: &mut D3DPipelineData,
        mask: AttribMask,
    ) -> Result<*mut ID3D11InputLayout> {
        if let Some(v) = pipeline.layouts.get(&mask) {
            return Ok(v.as_ref().map(|v| v.as_raw()).unwrap_or(ptr::null_mut()));
        }

        let layout = match Self::create_input_layout(device, pipeline, mask) {
            Ok(v) => v,
            Err(err) => {
                // The vertex shader may consume attributes that are masked out, those
                // read from the stale part of the vertex record instead.
                debug!("{}, retries with every attribute of the layout.", err);
                Self::create_input_layout(device, pipeline, AttribMask::all())?
            }
        };

        let raw = layout.as_ref().map(|v| v.as_raw()).unwrap_or(ptr::null_mut());
        pipeline.layouts.insert(mask, layout);
        Ok(raw)
    }

    unsafe fn create_input_layout(
        device: &ComPtr<ID3D11Device>,
        pipeline: &D3DPipelineData,
        mask: AttribMask,
    ) -> Result<Option<ComPtr<ID3D11InputLayout>>> {
        let mut elements = Vec::new();
        for (i, v) in pipeline.params.layout.attribs.iter().enumerate() {
            if v.enabled && mask.contains(v.index) {
                elements.push(D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: pipeline.semantics[i].as_ptr(),
                    SemanticIndex: v.semantic_index,
                    Format: types::attrib_format(v.typ),
                    InputSlot: 0,
                    AlignedByteOffset: v.offset as UINT,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                });
            }
        }

        if elements.is_empty() {
            return Ok(None);
        }

        let mut layout = ptr::null_mut();
        check(
            device.CreateInputLayout(
                elements.as_ptr(),
                elements.len() as UINT,
                pipeline.bytecode.as_ptr() as *const c_void,
                pipeline.bytecode.len(),
                &mut layout,
            ),
            "create input layout",
        )?;

        Ok(Some(out(layout, "create input layout")?))
    }

    unsafe fn bind_rasterizer(&self) {
        if let Some(pipeline) = self.pipeline.and_then(|v| self.pipelines.get(v)) {
            let i = if self.scissor { 1 } else { 0 };
            self.context.RSSetState(pipeline.rasterizers[i].as_raw());
        }
    }

    unsafe fn bound_pipeline(&self) -> Result<&D3DPipelineData> {
        self.pipeline
            .and_then(|v| self.pipelines.get(v))
            .ok_or_else(|| format_err!("Draw call without pipeline."))
    }
}

impl Visitor for D3D11Visitor {
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: &BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        let size = data.map(|v| v.len()).unwrap_or(0).max(params.size);
        let (buffer, capacity) = self.alloc_buffer(params, size, data)?;

        self.buffers.create(
            handle,
            D3DBufferData {
                buffer,
                params: *params,
                capacity,
            },
        );

        Ok(())
    }

    unsafe fn update_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let (params, capacity) = {
            let v = self
                .buffers
                .get(handle)
                .ok_or_else(|| format_err!("{} is invalid.", handle))?;
            (v.params, v.capacity)
        };

        if data.len() > capacity {
            // Buffers can not grow in place, recreates the native object behind the
            // same handle.
            let (buffer, capacity) = self.alloc_buffer(&params, data.len(), Some(data))?;
            if let Some(v) = self.buffers.get_mut(handle) {
                v.buffer = buffer;
                v.capacity = capacity;
            }

            return Ok(());
        }

        let buffer = self
            .buffers
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        let resource = buffer.buffer.as_raw() as *mut ID3D11Resource;
        if params.usage == BufferUsage::Static {
            self.context
                .UpdateSubresource(resource, 0, ptr::null(), data.as_ptr() as *const c_void, 0, 0);
        } else {
            let mut mapped: D3D11_MAPPED_SUBRESOURCE = mem::zeroed();
            check(
                self.context
                    .Map(resource, 0, D3D11_MAP_WRITE_DISCARD, 0, &mut mapped),
                "map buffer",
            )?;

            ptr::copy_nonoverlapping(data.as_ptr(), mapped.pData as *mut u8, data.len());
            self.context.Unmap(resource, 0);
        }

        Ok(())
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.buffers
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.index_buffer == Some(handle) {
            self.index_buffer = None;
        }

        Ok(())
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        _: &ShaderParams,
        source: &[u8],
    ) -> Result<()> {
        let vs_code = Self::compile(source, "VERT_SHADER", "vs_main", "vs_4_0")?;
        let ps_code = Self::compile(source, "FRAG_SHADER", "ps_main", "ps_4_0")?;

        let mut vs = ptr::null_mut();
        check(
            self.device.CreateVertexShader(
                vs_code.as_ptr() as *const c_void,
                vs_code.len(),
                ptr::null_mut(),
                &mut vs,
            ),
            "create vertex shader",
        )?;
        let vs = out(vs, "create vertex shader")?;

        let mut ps = ptr::null_mut();
        check(
            self.device.CreatePixelShader(
                ps_code.as_ptr() as *const c_void,
                ps_code.len(),
                ptr::null_mut(),
                &mut ps,
            ),
            "create pixel shader",
        )?;
        let ps = out(ps, "create pixel shader")?;

        self.shaders.create(
            handle,
            D3DShaderData {
                vs,
                ps,
                bytecode: vs_code,
            },
        );

        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        self.shaders
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        Ok(())
    }

    unsafe fn create_sampler(
        &mut self,
        handle: SamplerHandle,
        params: &SamplerParams,
    ) -> Result<()> {
        let desc = D3D11_SAMPLER_DESC {
            Filter: types::filter(params.filter),
            AddressU: types::address(params.wrap_x),
            AddressV: types::address(params.wrap_y),
            AddressW: types::address(params.wrap_z),
            MipLODBias: 0.0,
            MaxAnisotropy: 1,
            ComparisonFunc: D3D11_COMPARISON_NEVER,
            BorderColor: [0.0; 4],
            MinLOD: 0.0,
            MaxLOD: D3D11_FLOAT32_MAX,
        };

        let mut sampler = ptr::null_mut();
        check(
            self.device.CreateSamplerState(&desc, &mut sampler),
            "create sampler",
        )?;

        self.samplers.create(handle, out(sampler, "create sampler")?);
        Ok(())
    }

    unsafe fn delete_sampler(&mut self, handle: SamplerHandle) -> Result<()> {
        self.samplers
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        Ok(())
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: &TextureParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        if let Some(v) = data {
            if v.len() < params.bytes() {
                bail!(
                    "Texture data of {} bytes is too small for {:?}.",
                    v.len(),
                    params
                );
            }
        }

        let texture = self.alloc_texture(params, data)?;
        self.textures.create(handle, texture);
        Ok(())
    }

    unsafe fn resize_texture(
        &mut self,
        handle: TextureHandle,
        dimensions: Vector2<u32>,
    ) -> Result<()> {
        let mut params = self
            .textures
            .get(handle)
            .map(|v| v.params)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        params.dimensions = dimensions;
        let texture = self.alloc_texture(&params, None)?;
        if let Some(v) = self.textures.get_mut(handle) {
            *v = texture;
        }

        Ok(())
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        self.textures
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        Ok(())
    }

    unsafe fn create_render_pass(
        &mut self,
        handle: RenderPassHandle,
        params: &RenderPassParams,
    ) -> Result<()> {
        if params.colors.len() > D3D11_SIMULTANEOUS_RENDER_TARGET_COUNT as usize {
            bail!("Too many color attachments ({}).", params.colors.len());
        }

        if !params.is_backbuffer() {
            for v in &params.colors {
                match *v {
                    RenderTarget::Texture(t) => {
                        let texture = self
                            .textures
                            .get(t)
                            .ok_or_else(|| format_err!("{} is invalid.", t))?;

                        if texture.rtv.is_none() {
                            bail!("Color target {} has a depth format.", t);
                        }
                    }
                    RenderTarget::Backbuffer => {
                        bail!("The backbuffer can not be mixed with texture targets.")
                    }
                }
            }

            if let Some(t) = params.depth_stencil {
                let texture = self
                    .textures
                    .get(t)
                    .ok_or_else(|| format_err!("{} is invalid.", t))?;

                if texture.dsv.is_none() {
                    bail!("Depth target {} has a color format.", t);
                }
            }
        }

        // Views are resolved when the pass begins, so resized textures are picked up.
        self.passes.create(handle, params.clone());
        Ok(())
    }

    unsafe fn delete_render_pass(&mut self, handle: RenderPassHandle) -> Result<()> {
        self.passes
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        Ok(())
    }

    unsafe fn create_render_pipeline(
        &mut self,
        handle: RenderPipelineHandle,
        params: &RenderPipelineParams,
    ) -> Result<()> {
        let bytecode = self
            .shaders
            .get(params.shader)
            .map(|v| v.bytecode.clone())
            .ok_or_else(|| format_err!("{} is invalid.", params.shader))?;

        let mut semantics = Vec::with_capacity(params.layout.attribs.len());
        for v in &params.layout.attribs {
            semantics.push(CString::new(v.semantic)?);
        }

        let mut blend_desc: D3D11_BLEND_DESC = mem::zeroed();
        {
            let target = &mut blend_desc.RenderTarget[0];
            target.RenderTargetWriteMask = D3D11_COLOR_WRITE_ENABLE_ALL as u8;
            target.BlendOp = D3D11_BLEND_OP_ADD;
            target.BlendOpAlpha = D3D11_BLEND_OP_ADD;
            target.SrcBlend = D3D11_BLEND_ONE;
            target.DestBlend = D3D11_BLEND_ZERO;
            target.SrcBlendAlpha = D3D11_BLEND_ONE;
            target.DestBlendAlpha = D3D11_BLEND_ZERO;

            if let Some((src, dst)) = types::blend_factors(params.blend) {
                target.BlendEnable = TRUE;
                target.SrcBlend = src;
                target.DestBlend = dst;
                target.SrcBlendAlpha = src;
                target.DestBlendAlpha = dst;
            }
        }

        let mut blend = ptr::null_mut();
        check(
            self.device.CreateBlendState(&blend_desc, &mut blend),
            "create blend state",
        )?;
        let blend = out(blend, "create blend state")?;

        let mut depth_desc: D3D11_DEPTH_STENCIL_DESC = mem::zeroed();
        depth_desc.DepthEnable = if params.depth_read || params.depth_write {
            TRUE
        } else {
            FALSE
        };
        depth_desc.DepthWriteMask = if params.depth_write {
            D3D11_DEPTH_WRITE_MASK_ALL
        } else {
            D3D11_DEPTH_WRITE_MASK_ZERO
        };
        // Writing without reading has to pass every fragment.
        depth_desc.DepthFunc = if params.depth_read {
            types::comparison(params.depth_op)
        } else {
            D3D11_COMPARISON_ALWAYS
        };

        let mut depth = ptr::null_mut();
        check(
            self.device.CreateDepthStencilState(&depth_desc, &mut depth),
            "create depth stencil state",
        )?;
        let depth = out(depth, "create depth stencil state")?;

        let rasterizers = [
            self.rasterizer(params.cull, false)?,
            self.rasterizer(params.cull, true)?,
        ];

        self.pipelines.create(
            handle,
            D3DPipelineData {
                params: params.clone(),
                bytecode,
                semantics,
                blend,
                depth,
                rasterizers,
                layouts: HashMap::new(),
            },
        );

        Ok(())
    }

    unsafe fn delete_render_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()> {
        self.pipelines
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.pipeline == Some(handle) {
            self.pipeline = None;
        }

        Ok(())
    }

    unsafe fn set_viewport(&mut self, viewport: Rect) -> Result<()> {
        let vp = D3D11_VIEWPORT {
            TopLeftX: viewport.x,
            TopLeftY: viewport.y,
            Width: viewport.w,
            Height: viewport.h,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };

        self.context.RSSetViewports(1, &vp);
        Ok(())
    }

    unsafe fn begin_scissor(&mut self, rect: Rect, _: Vector2<u32>) -> Result<()> {
        // Already top-left based.
        let rect = D3D11_RECT {
            left: rect.x as i32,
            top: rect.y as i32,
            right: rect.right() as i32,
            bottom: rect.bottom() as i32,
        };

        self.context.RSSetScissorRects(1, &rect);
        self.scissor = true;
        self.bind_rasterizer();
        Ok(())
    }

    unsafe fn end_scissor(&mut self) -> Result<()> {
        self.scissor = false;
        self.bind_rasterizer();
        Ok(())
    }

    unsafe fn begin_render_pass(&mut self, handle: RenderPassHandle) -> Result<()> {
        let params = self
            .passes
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        // Render targets might still be bound as shader inputs.
        let nulls = [ptr::null_mut(); MAX_TEXTURE_UNITS];
        self.context
            .PSSetShaderResources(0, nulls.len() as UINT, nulls.as_ptr());

        let mut rtvs: Vec<*mut ID3D11RenderTargetView> = Vec::new();
        let mut dsv = ptr::null_mut();

        if params.is_backbuffer() {
            // The swap chain has no depth buffer.
            let backbuffer = self
                .backbuffer
                .as_ref()
                .ok_or_else(|| format_err!("[D3D11] The backbuffer is not available."))?;
            rtvs.push(backbuffer.as_raw());
        } else {
            for v in &params.colors {
                if let RenderTarget::Texture(t) = *v {
                    let view = self
                        .textures
                        .get(t)
                        .and_then(|v| v.rtv.as_ref())
                        .ok_or_else(|| format_err!("{} is invalid.", t))?;
                    rtvs.push(view.as_raw());
                }
            }

            if let Some(t) = params.depth_stencil {
                dsv = self
                    .textures
                    .get(t)
                    .and_then(|v| v.dsv.as_ref())
                    .map(|v| v.as_raw())
                    .ok_or_else(|| format_err!("{} is invalid.", t))?;
            }
        }

        self.context
            .OMSetRenderTargets(rtvs.len() as UINT, rtvs.as_ptr(), dsv);

        if params.clear {
            let c = params.clear_color;
            let color = [c.r, c.g, c.b, c.a];
            for &v in &rtvs {
                self.context.ClearRenderTargetView(v, &color);
            }

            if !dsv.is_null() {
                self.context.ClearDepthStencilView(
                    dsv,
                    D3D11_CLEAR_DEPTH | D3D11_CLEAR_STENCIL,
                    1.0,
                    0,
                );
            }
        }

        self.pipeline = None;
        Ok(())
    }

    unsafe fn end_render_pass(&mut self) -> Result<()> {
        self.pipeline = None;
        Ok(())
    }

    unsafe fn bind_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()> {
        let pipeline = self
            .pipelines
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        let shader = self
            .shaders
            .get(pipeline.params.shader)
            .ok_or_else(|| format_err!("{} is invalid.", pipeline.params.shader))?;

        let ctx = &self.context;
        ctx.IASetPrimitiveTopology(types::topology(pipeline.params.draw_mode));
        ctx.VSSetShader(shader.vs.as_raw(), ptr::null(), 0);
        ctx.PSSetShader(shader.ps.as_raw(), ptr::null(), 0);
        ctx.OMSetBlendState(pipeline.blend.as_raw(), &[0.0; 4], 0xFFFF_FFFF);
        ctx.OMSetDepthStencilState(pipeline.depth.as_raw(), 0);

        self.pipeline = Some(handle);
        self.bind_rasterizer();
        Ok(())
    }

    unsafe fn bind_buffer(
        &mut self,
        handle: BufferHandle,
        slot: u32,
        mask: AttribMask,
    ) -> Result<()> {
        let (raw, typ) = {
            let buffer = self
                .buffers
                .get(handle)
                .ok_or_else(|| format_err!("{} is invalid.", handle))?;
            (buffer.buffer.as_raw(), buffer.params.typ)
        };

        match typ {
            BufferType::Uniform => {
                self.context.VSSetConstantBuffers(slot, 1, &raw);
                self.context.PSSetConstantBuffers(slot, 1, &raw);
            }
            BufferType::Element => {
                // The index format is only known once a draw is issued.
                self.index_buffer = Some(handle);
            }
            BufferType::Vertex => {
                let device = &self.device;
                let pipeline = match self.pipeline {
                    Some(v) => self.pipelines.get_mut(v),
                    None => None,
                }
                .ok_or_else(|| format_err!("Vertex buffers require a bound pipeline."))?;

                let stride = pipeline.params.layout.stride as UINT;
                let layout = Self::input_layout(device, pipeline, mask)?;

                self.context.IASetInputLayout(layout);
                self.context.IASetVertexBuffers(0, 1, &raw, &stride, &0);
            }
        }

        Ok(())
    }

    unsafe fn bind_texture(
        &mut self,
        texture: TextureHandle,
        sampler: Option<SamplerHandle>,
        unit: u32,
    ) -> Result<()> {
        let srv = self
            .textures
            .get(texture)
            .ok_or_else(|| format_err!("{} is invalid.", texture))?
            .srv
            .as_ref()
            .map(|v| v.as_raw())
            .ok_or_else(|| format_err!("Depth texture {} can not be sampled.", texture))?;

        let sampler = match sampler {
            Some(v) => self
                .samplers
                .get(v)
                .map(|v| v.as_raw())
                .ok_or_else(|| format_err!("{} is invalid.", v))?,
            None => ptr::null_mut(),
        };

        self.context.PSSetShaderResources(unit, 1, &srv);
        self.context.PSSetSamplers(unit, 1, &sampler);
        Ok(())
    }

    unsafe fn draw_arrays(&mut self, count: u32) -> Result<()> {
        self.bound_pipeline()?;
        self.context.Draw(count, 0);
        Ok(())
    }

    unsafe fn draw_elements(&mut self, count: u32, typ: ElementType, offset: usize) -> Result<()> {
        self.bound_pipeline()?;

        let buffer = self
            .index_buffer
            .and_then(|v| self.buffers.get(v))
            .ok_or_else(|| format_err!("Element draw without element buffer."))?;

        self.context
            .IASetIndexBuffer(buffer.buffer.as_raw(), types::element_format(typ), 0);
        self.context
            .DrawIndexed(count, (offset / typ.stride()) as UINT, 0);
        Ok(())
    }

    unsafe fn resize_backbuffer(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        // Every reference to the swap chain buffers has to be released first.
        self.context
            .OMSetRenderTargets(0, ptr::null(), ptr::null_mut());
        self.backbuffer = None;

        check(
            self.swapchain.ResizeBuffers(
                0,
                dimensions.x,
                dimensions.y,
                DXGI_FORMAT_UNKNOWN,
                0,
            ),
            "resize the swap chain",
        )?;

        self.backbuffer = Some(self.create_backbuffer_view()?);
        Ok(())
    }

    unsafe fn present(&mut self, _: &dyn Window) -> Result<()> {
        check(self.swapchain.Present(0, 0), "present")
    }
}

impl Drop for D3D11Visitor {
    fn drop(&mut self) {
        unsafe {
            self.context.ClearState();
        }

        self.pipelines.drain();
        self.passes.drain();
        self.textures.drain();
        self.samplers.drain();
        self.shaders.drain();
        self.buffers.drain();
        self.backbuffer = None;
    }
}
