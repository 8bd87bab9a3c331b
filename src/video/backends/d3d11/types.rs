use winapi::shared::dxgiformat::*;
use winapi::shared::minwindef::UINT;
use winapi::um::d3d11::*;
use winapi::um::d3dcommon::*;

use super::super::super::assets::prelude::*;

pub fn bind_flags(typ: BufferType) -> UINT {
    match typ {
        BufferType::Vertex => D3D11_BIND_VERTEX_BUFFER,
        BufferType::Element => D3D11_BIND_INDEX_BUFFER,
        BufferType::Uniform => D3D11_BIND_CONSTANT_BUFFER,
    }
}

/// Resource usage and CPU access flags. Static buffers are updated with
/// `UpdateSubresource`, the others are mapped with `WRITE_DISCARD`.
pub fn usage(usage: BufferUsage) -> (D3D11_USAGE, UINT) {
    match usage {
        BufferUsage::Static => (D3D11_USAGE_DEFAULT, 0),
        BufferUsage::Dynamic => (D3D11_USAGE_DYNAMIC, D3D11_CPU_ACCESS_WRITE),
        // There is no dedicated stream usage.
        BufferUsage::Stream => (D3D11_USAGE_DYNAMIC, D3D11_CPU_ACCESS_WRITE),
    }
}

pub fn element_format(typ: ElementType) -> DXGI_FORMAT {
    match typ {
        ElementType::UnsignedShort => DXGI_FORMAT_R16_UINT,
        ElementType::UnsignedInt => DXGI_FORMAT_R32_UINT,
    }
}

pub fn filter(filter: SamplerFilter) -> D3D11_FILTER {
    match filter {
        SamplerFilter::Nearest => D3D11_FILTER_MIN_MAG_MIP_POINT,
        SamplerFilter::Linear => D3D11_FILTER_MIN_MAG_MIP_LINEAR,
    }
}

pub fn address(wrap: SamplerWrap) -> D3D11_TEXTURE_ADDRESS_MODE {
    match wrap {
        SamplerWrap::Repeat => D3D11_TEXTURE_ADDRESS_WRAP,
        SamplerWrap::Clamp => D3D11_TEXTURE_ADDRESS_CLAMP,
    }
}

pub fn texture_format(format: TextureFormat) -> DXGI_FORMAT {
    match format {
        TextureFormat::R8 => DXGI_FORMAT_R8_UNORM,
        TextureFormat::RGBA8 => DXGI_FORMAT_R8G8B8A8_UNORM,
        TextureFormat::D24S8 => DXGI_FORMAT_D24_UNORM_S8_UINT,
    }
}

/// Dimension of the shader resource view of a texture type.
pub fn srv_dimension(typ: TextureType) -> D3D11_SRV_DIMENSION {
    match typ {
        TextureType::Texture2D => D3D11_SRV_DIMENSION_TEXTURE2D,
    }
}

pub fn topology(mode: DrawMode) -> D3D11_PRIMITIVE_TOPOLOGY {
    match mode {
        DrawMode::Points => D3D_PRIMITIVE_TOPOLOGY_POINTLIST,
        DrawMode::Lines => D3D_PRIMITIVE_TOPOLOGY_LINELIST,
        DrawMode::LineStrip => D3D_PRIMITIVE_TOPOLOGY_LINESTRIP,
        DrawMode::Triangles => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        DrawMode::TriangleStrip => D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
    }
}

pub fn cull_mode(face: CullFace) -> D3D11_CULL_MODE {
    match face {
        CullFace::None => D3D11_CULL_NONE,
        CullFace::Front => D3D11_CULL_FRONT,
        CullFace::Back => D3D11_CULL_BACK,
    }
}

pub fn comparison(op: DepthOp) -> D3D11_COMPARISON_FUNC {
    match op {
        DepthOp::Never => D3D11_COMPARISON_NEVER,
        DepthOp::Equal => D3D11_COMPARISON_EQUAL,
        DepthOp::NotEqual => D3D11_COMPARISON_NOT_EQUAL,
        DepthOp::Less => D3D11_COMPARISON_LESS,
        DepthOp::LessEqual => D3D11_COMPARISON_LESS_EQUAL,
        DepthOp::Greater => D3D11_COMPARISON_GREATER,
        DepthOp::GreaterEqual => D3D11_COMPARISON_GREATER_EQUAL,
        DepthOp::Always => D3D11_COMPARISON_ALWAYS,
    }
}

/// Source and destination factors, `None` disables blending.
pub fn blend_factors(mode: BlendMode) -> Option<(D3D11_BLEND, D3D11_BLEND)> {
    match mode {
        BlendMode::None => None,
        BlendMode::Alpha => Some((D3D11_BLEND_SRC_ALPHA, D3D11_BLEND_INV_SRC_ALPHA)),
        BlendMode::PremultipliedAlpha => Some((D3D11_BLEND_ONE, D3D11_BLEND_INV_SRC_ALPHA)),
    }
}

pub fn attrib_format(typ: AttribType) -> DXGI_FORMAT {
    match typ {
        AttribType::UByte4 => DXGI_FORMAT_R8G8B8A8_UNORM,
        AttribType::Float1 => DXGI_FORMAT_R32_FLOAT,
        AttribType::Float2 => DXGI_FORMAT_R32G32_FLOAT,
        AttribType::Float3 => DXGI_FORMAT_R32G32B32_FLOAT,
        AttribType::Float4 => DXGI_FORMAT_R32G32B32A32_FLOAT,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn distinct<T: Copy, V: Eq + ::std::hash::Hash>(variants: &[T], map: impl Fn(T) -> V) {
        let values: HashSet<V> = variants.iter().map(|v| map(*v)).collect();
        assert_eq!(values.len(), variants.len());
    }

    #[test]
    fn every_variant_is_mapped() {
        distinct(BufferType::VARIANTS, bind_flags);
        for &v in BufferUsage::VARIANTS {
            let (_, access) = usage(v);
            assert_eq!(access != 0, v != BufferUsage::Static);
        }

        distinct(ElementType::VARIANTS, element_format);
        distinct(SamplerFilter::VARIANTS, filter);
        distinct(SamplerWrap::VARIANTS, address);
        distinct(TextureType::VARIANTS, srv_dimension);
        distinct(TextureFormat::VARIANTS, texture_format);
        distinct(DrawMode::VARIANTS, topology);
        distinct(CullFace::VARIANTS, cull_mode);
        distinct(DepthOp::VARIANTS, comparison);
        distinct(BlendMode::VARIANTS, blend_factors);
        distinct(AttribType::VARIANTS, attrib_format);
    }
}
