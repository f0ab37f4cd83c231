//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Textured 2D vertex, tinted by `color`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 2], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: (2 * std::mem::size_of::<[f32; 2]>()) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const HAZARD: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const SHIELD: [f32; 4] = [0.2, 0.8, 1.0, 1.0];
    pub const TIME_ORB: [f32; 4] = [0.6, 0.4, 1.0, 1.0];
    /// #111
    pub const BACKGROUND: [f32; 4] = [0.067, 0.067, 0.067, 1.0];
    pub const ICE_BACKGROUND: [f32; 4] = [0.05, 0.09, 0.16, 1.0];
    /// Letterbox bars around the field
    pub const LETTERBOX: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    pub const INTENSE_TINT: [f32; 4] = [0.196, 0.0, 0.0, 0.3];
    pub const ICE_TINT: [f32; 4] = [0.4, 0.7, 1.0, 0.12];
    pub const ABYSS_TINT: [f32; 4] = [0.15, 0.0, 0.25, 0.35];
    pub const TIME_SLOW_TINT: [f32; 4] = [0.2, 0.4, 1.0, 0.12];
    pub const TIME_SLOW_BAR: [f32; 4] = [0.6, 0.4, 1.0, 0.9];
    pub const GAME_OVER_DIM: [f32; 4] = [0.0, 0.0, 0.0, 0.85];
}
