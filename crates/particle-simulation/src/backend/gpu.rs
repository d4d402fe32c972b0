//! Headless wgpu compute backend
//!
//! Each stage uploads the snapshot as flat `f32` storage buffers, runs one
//! dispatch of `shaders/accelerations.wgsl` and blocks on the read-back.

use ndarray::Array2;
use particle_physics::{PhysicsParams, Snapshot};
use wgpu::util::DeviceExt;

use super::{Backend, BackendKind};
use crate::error::BackendError;
use crate::params::GpuParams;

const WORKGROUP_SIZE: u32 = 64;

/// GPU executor owning its device, queue and compute pipeline
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    adapter_name: String,
}

impl GpuBackend {
    /// Acquire a high-performance adapter without a surface
    pub fn new() -> Result<Self, BackendError> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_name = adapter.get_info().name;
        log::info!("Using GPU: {}", adapter_name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Particle Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Acceleration Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/accelerations.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Acceleration Bind Group Layout"),
            entries: &[
                layout_entry(0, wgpu::BufferBindingType::Uniform),
                layout_entry(1, wgpu::BufferBindingType::Storage { read_only: true }),
                layout_entry(2, wgpu::BufferBindingType::Storage { read_only: true }),
                layout_entry(3, wgpu::BufferBindingType::Storage { read_only: true }),
                layout_entry(4, wgpu::BufferBindingType::Storage { read_only: false }),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Acceleration Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Acceleration Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("GPU acceleration pipeline ready");

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            adapter_name,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    fn storage_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::STORAGE,
            })
    }
}

fn layout_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl Backend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn accelerations(
        &self,
        snapshot: &Snapshot<'_>,
        physics: &PhysicsParams,
        collision_dt: Option<f64>,
    ) -> Result<Array2<f64>, BackendError> {
        let count = snapshot.len();
        let dimension = snapshot.dimension();
        if count == 0 || dimension == 0 {
            return Ok(Array2::zeros((count, dimension)));
        }

        let positions: Vec<f32> = snapshot.positions.iter().map(|&x| x as f32).collect();
        let velocities: Vec<f32> = snapshot
            .velocities
            .iter()
            .chain(snapshot.focal_velocities.iter())
            .map(|&v| v as f32)
            .collect();
        let properties: Vec<[f32; 4]> = (0..count)
            .map(|i| {
                [
                    snapshot.masses[i] as f32,
                    snapshot.charges[i] as f32,
                    snapshot.radii[i] as f32,
                    0.0,
                ]
            })
            .collect();
        let params = GpuParams::new(count, dimension, physics, collision_dt);

        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Acceleration Params Buffer"),
                contents: bytemuck::cast_slice(&[params]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let position_buffer = self.storage_buffer("Position Buffer", bytemuck::cast_slice(&positions));
        let velocity_buffer = self.storage_buffer("Velocity Buffer", bytemuck::cast_slice(&velocities));
        let property_buffer = self.storage_buffer("Property Buffer", bytemuck::cast_slice(&properties));

        let output_size = (count * dimension * std::mem::size_of::<f32>()) as u64;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Acceleration Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Acceleration Staging Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Acceleration Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: velocity_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: property_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: output_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Acceleration Encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Acceleration Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups((count as u32).div_ceil(WORKGROUP_SIZE), 1, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging_buffer, 0, output_size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| BackendError::BufferMapping(e.to_string()))?;
        rx.recv()
            .map_err(|e| BackendError::BufferMapping(e.to_string()))?
            .map_err(|e| BackendError::BufferMapping(e.to_string()))?;

        let values: Vec<f64> = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&data)
                .iter()
                .map(|&a| a as f64)
                .collect()
        };
        staging_buffer.unmap();

        Array2::from_shape_vec((count, dimension), values)
            .map_err(|e| BackendError::BufferMapping(e.to_string()))
    }
}
