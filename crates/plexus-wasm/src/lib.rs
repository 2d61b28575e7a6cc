use plexus_core::animation::{AnimationState, LineVertex, ParticleVertex};
use plexus_core::config::PlexusConfig;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

fn seeded_rng(seed: u32) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed as u64)
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Particle field exposed to the page. The page draws; this only simulates
/// and fills two vertex buffers it can upload directly.
#[wasm_bindgen]
pub struct PlexusField {
    state: AnimationState,
    particle_buffer: Vec<ParticleVertex>,
    line_buffer: Vec<LineVertex>,
}

#[wasm_bindgen]
impl PlexusField {
    /// `seed == 0` seeds from the browser's entropy source.
    #[wasm_bindgen(constructor)]
    pub fn new(
        particle_count: usize,
        connection_radius: f32,
        frame_rate: f32,
        seed: u32,
    ) -> Result<PlexusField, JsValue> {
        let config = PlexusConfig {
            particle_count,
            connection_radius,
            frame_rate,
            ..PlexusConfig::default()
        };
        Self::with_config(config, seed)
    }

    /// Build from a JSON settings bundle; missing fields use defaults.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(config: &str, seed: u32) -> Result<PlexusField, JsValue> {
        let config: PlexusConfig = serde_json::from_str(config).map_err(js_error)?;
        Self::with_config(config, seed)
    }

    /// Advance if a frame is due. `now_ms` is `performance.now()`.
    /// Returns `true` when the buffers changed.
    #[wasm_bindgen]
    pub fn update(&mut self, now_ms: f64) -> bool {
        let stepped = self.state.update(now_ms / 1000.0);
        if stepped {
            self.write_gpu_output();
        }
        stepped
    }

    /// Simulate `dt` seconds unconditionally.
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32) {
        self.state.step(dt);
        self.write_gpu_output();
    }

    #[wasm_bindgen]
    pub fn reinitialize(&mut self, seed: u32) {
        self.state.reinitialize(&mut seeded_rng(seed));
        self.write_gpu_output();
    }

    #[wasm_bindgen]
    pub fn get_particle_buffer_ptr(&self) -> *const f32 {
        self.particle_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_particle_buffer_byte_length(&self) -> usize {
        bytemuck::cast_slice::<ParticleVertex, u8>(&self.particle_buffer).len()
    }

    /// Line list: two vertices per edge.
    #[wasm_bindgen]
    pub fn get_line_buffer_ptr(&self) -> *const f32 {
        self.line_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_line_buffer_byte_length(&self) -> usize {
        bytemuck::cast_slice::<LineVertex, u8>(&self.line_buffer).len()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.particle_buffer.len()
    }

    #[wasm_bindgen]
    pub fn edge_count(&self) -> usize {
        self.state.edges().len()
    }
}

impl PlexusField {
    fn with_config(config: PlexusConfig, seed: u32) -> Result<PlexusField, JsValue> {
        let state = AnimationState::new(config, &mut seeded_rng(seed)).map_err(js_error)?;

        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(
            &format!(
                "PlexusField created: {} particles, radius {}",
                state.particle_set().count,
                state.config().connection_radius
            )
            .into(),
        );

        let mut field = PlexusField {
            state,
            particle_buffer: Vec::new(),
            line_buffer: Vec::new(),
        };
        field.write_gpu_output();
        Ok(field)
    }

    fn write_gpu_output(&mut self) {
        self.state.write_particle_vertices(&mut self.particle_buffer);
        self.state.write_line_vertices(&mut self.line_buffer);
    }
}
