/// Particle decorations — confetti bursts and the cursor trail.
///
/// Deterministic given a seed; the library owns motion and lifetimes,
/// the host draws `particles()` however it likes. Positions are unit
/// viewport coordinates (0.0..1.0 on both axes, y pointing down).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Downward pull, viewport units per second squared.
const GRAVITY: f32 = 1.8;

/// One piece of confetti in flight.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: String,
    pub ttl_ms: u64,
}

/// Spawn parameters. Defaults are the unlock celebration: 100 particles,
/// a 70 degree fan from just below center, pastel palette.
#[derive(Debug, Clone)]
pub struct BurstParams {
    pub count: usize,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Full spread angle in degrees, centered on straight up.
    pub spread_deg: f32,
    /// Initial speed in viewport units per second.
    pub start_velocity: f32,
    pub palette: Vec<String>,
    pub ttl_ms: u64,
}

impl Default for BurstParams {
    fn default() -> Self {
        Self {
            count: 100,
            origin_x: 0.5,
            origin_y: 0.6,
            spread_deg: 70.0,
            start_velocity: 0.9,
            palette: vec![
                "#ffc8dd".to_string(),
                "#e0b0ff".to_string(),
                "#bde0fe".to_string(),
            ],
            ttl_ms: 2000,
        }
    }
}

/// A single explosion of particles.
#[derive(Debug, Clone, Default)]
pub struct ConfettiBurst {
    particles: Vec<Particle>,
}

impl ConfettiBurst {
    pub fn spawn(rng: &mut impl Rng, params: &BurstParams) -> Self {
        let half_spread = params.spread_deg.to_radians() / 2.0;
        let mut particles = Vec::with_capacity(params.count);
        for _ in 0..params.count {
            let jitter = rng.gen::<f32>() * 2.0 - 1.0;
            let angle = -std::f32::consts::FRAC_PI_2 + jitter * half_spread;
            let speed = params.start_velocity * (0.4 + rng.gen::<f32>() * 0.6);
            let color = if params.palette.is_empty() {
                "#ffffff".to_string()
            } else {
                params.palette[rng.gen_range(0..params.palette.len())].clone()
            };
            particles.push(Particle {
                x: params.origin_x,
                y: params.origin_y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                color,
                ttl_ms: params.ttl_ms,
            });
        }
        Self { particles }
    }

    /// Integrates motion and retires expired particles.
    pub fn step(&mut self, ms: u64) {
        let dt = ms as f32 / 1000.0;
        for p in &mut self.particles {
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vy += GRAVITY * dt;
            p.ttl_ms = p.ttl_ms.saturating_sub(ms);
        }
        self.particles.retain(|p| p.ttl_ms > 0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_done(&self) -> bool {
        self.particles.is_empty()
    }
}

/// The finale celebration: bursts from both screen edges every quarter
/// second, with particle counts decaying linearly to zero over the
/// show's duration.
#[derive(Debug)]
pub struct ConfettiShow {
    rng: StdRng,
    bursts: Vec<ConfettiBurst>,
    elapsed_ms: u64,
    duration_ms: u64,
    interval_ms: u64,
    next_burst_at: u64,
}

impl ConfettiShow {
    pub const DURATION_MS: u64 = 3000;
    pub const INTERVAL_MS: u64 = 250;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            bursts: Vec::new(),
            elapsed_ms: 0,
            duration_ms: Self::DURATION_MS,
            interval_ms: Self::INTERVAL_MS,
            next_burst_at: Self::INTERVAL_MS,
        }
    }

    /// A one-off celebration (the lock screen's unlock burst): a single
    /// default burst, no repeats.
    pub fn burst_once(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let burst = ConfettiBurst::spawn(&mut rng, &BurstParams::default());
        Self {
            rng,
            bursts: vec![burst],
            elapsed_ms: 0,
            duration_ms: 0,
            interval_ms: Self::INTERVAL_MS,
            next_burst_at: 0,
        }
    }

    /// Advances the show: fires any side bursts that came due, then moves
    /// live particles.
    pub fn step(&mut self, ms: u64) {
        self.elapsed_ms += ms;
        while self.next_burst_at <= self.elapsed_ms && self.next_burst_at < self.duration_ms {
            let time_left = self.duration_ms - self.next_burst_at;
            self.spawn_side_bursts(time_left);
            self.next_burst_at += self.interval_ms;
        }
        for burst in &mut self.bursts {
            burst.step(ms);
        }
        self.bursts.retain(|b| !b.is_done());
    }

    fn spawn_side_bursts(&mut self, time_left_ms: u64) {
        let count = (50 * time_left_ms / self.duration_ms) as usize;
        if count == 0 {
            return;
        }
        for (lo, hi) in [(0.1f32, 0.3f32), (0.7f32, 0.9f32)] {
            let params = BurstParams {
                count,
                origin_x: lo + self.rng.gen::<f32>() * (hi - lo),
                origin_y: self.rng.gen::<f32>() - 0.2,
                spread_deg: 360.0,
                start_velocity: 0.6,
                ttl_ms: 1500,
                ..BurstParams::default()
            };
            let burst = ConfettiBurst::spawn(&mut self.rng, &params);
            self.bursts.push(burst);
        }
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.bursts.iter().flat_map(|b| b.particles().iter())
    }

    pub fn particle_count(&self) -> usize {
        self.bursts.iter().map(|b| b.particles().len()).sum()
    }

    pub fn is_done(&self) -> bool {
        self.elapsed_ms >= self.duration_ms && self.bursts.is_empty()
    }
}

/// One blossom of the cursor trail.
#[derive(Debug, Clone)]
pub struct TrailParticle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub age_ms: u64,
}

/// Rate-limited trail following the pointer; each particle drifts up and
/// fades out over its lifetime.
#[derive(Debug, Clone)]
pub struct CursorTrail {
    particles: Vec<TrailParticle>,
    next_id: u64,
    last_emit_ms: Option<u64>,
    clock_ms: u64,
    min_interval_ms: u64,
    ttl_ms: u64,
}

impl CursorTrail {
    pub const MIN_INTERVAL_MS: u64 = 50;
    pub const TTL_MS: u64 = 1000;
    /// Upward drift over a particle's full lifetime, viewport units.
    const RISE: f32 = 0.05;

    pub fn new() -> Self {
        Self::with_timing(Self::MIN_INTERVAL_MS, Self::TTL_MS)
    }

    pub fn with_timing(min_interval_ms: u64, ttl_ms: u64) -> Self {
        Self {
            particles: Vec::new(),
            next_id: 0,
            last_emit_ms: None,
            clock_ms: 0,
            min_interval_ms,
            ttl_ms: ttl_ms.max(1),
        }
    }

    /// Reports a pointer position. Emits a particle unless one was
    /// emitted within the minimum interval; returns the new id.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> Option<u64> {
        if let Some(last) = self.last_emit_ms {
            if self.clock_ms - last < self.min_interval_ms {
                return None;
            }
        }
        self.last_emit_ms = Some(self.clock_ms);
        let id = self.next_id;
        self.next_id += 1;
        self.particles.push(TrailParticle {
            id,
            x,
            y,
            age_ms: 0,
        });
        Some(id)
    }

    /// Ages particles, applies the upward drift, drops the expired.
    pub fn step(&mut self, ms: u64) {
        self.clock_ms += ms;
        let drift = Self::RISE * ms as f32 / self.ttl_ms as f32;
        for p in &mut self.particles {
            p.y -= drift;
            p.age_ms += ms;
        }
        let ttl = self.ttl_ms;
        self.particles.retain(|p| p.age_ms < ttl);
    }

    /// 1.0 at emission, fading to 0.0 at expiry.
    pub fn opacity(&self, p: &TrailParticle) -> f32 {
        1.0 - (p.age_ms as f32 / self.ttl_ms as f32).min(1.0)
    }

    pub fn particles(&self) -> &[TrailParticle] {
        &self.particles
    }
}

impl Default for CursorTrail {
    fn default() -> Self {
        Self::new()
    }
}
