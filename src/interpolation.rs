use glam::{Vec2, Vec3, Vec4};

/// Values the damped driver can move component-wise toward a target.
pub trait Lerp: Copy {
    fn lerp_toward(self, target: Self, rate: f32) -> Self;
    /// Largest per-component absolute difference, used for convergence checks.
    fn max_delta(self, other: Self) -> f32;
}

impl Lerp for f32 {
    fn lerp_toward(self, target: Self, rate: f32) -> Self {
        self + (target - self) * rate
    }

    fn max_delta(self, other: Self) -> f32 {
        (self - other).abs()
    }
}

impl Lerp for Vec2 {
    fn lerp_toward(self, target: Self, rate: f32) -> Self {
        self + (target - self) * rate
    }

    fn max_delta(self, other: Self) -> f32 {
        (self - other).abs().max_element()
    }
}

impl Lerp for Vec3 {
    fn lerp_toward(self, target: Self, rate: f32) -> Self {
        self + (target - self) * rate
    }

    fn max_delta(self, other: Self) -> f32 {
        (self - other).abs().max_element()
    }
}

impl Lerp for Vec4 {
    fn lerp_toward(self, target: Self, rate: f32) -> Self {
        self + (target - self) * rate
    }

    fn max_delta(self, other: Self) -> f32 {
        (self - other).abs().max_element()
    }
}

/// Rates outside (0, 1] would overshoot or stall; NaN collapses to a full snap.
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        return 1.0;
    }
    rate.clamp(f32::EPSILON, 1.0)
}

/// Exponential approach `current <- current + (target - current) * rate`, one step per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damped<T: Lerp> {
    pub current: T,
    pub target: T,
    rate: f32,
}

impl<T: Lerp> Damped<T> {
    pub fn new(initial: T, rate: f32) -> Self {
        Self { current: initial, target: initial, rate: clamp_rate(rate) }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp_rate(rate);
    }

    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    pub fn step(&mut self) -> T {
        self.current = self.current.lerp_toward(self.target, self.rate);
        self.current
    }

    pub fn snap(&mut self) {
        self.current = self.target;
    }

    pub fn distance(&self) -> f32 {
        self.current.max_delta(self.target)
    }
}

/// Closed form of `n` damped steps from `initial` toward a constant `target`.
pub fn predicted_after(initial: f32, target: f32, rate: f32, ticks: u32) -> f32 {
    let rate = clamp_rate(rate);
    target - (target - initial) * (1.0 - rate).powi(ticks as i32)
}

/// Two-speed pointer chaser: a slow outer ring, a fast inner dot and a hover scale.
#[derive(Debug, Clone, Copy)]
pub struct PointerFollower {
    pub outer: Damped<Vec2>,
    pub inner: Damped<Vec2>,
    pub scale: Damped<f32>,
    hover_scale: f32,
}

impl PointerFollower {
    pub fn new(origin: Vec2, outer_rate: f32, inner_rate: f32) -> Self {
        Self {
            outer: Damped::new(origin, outer_rate),
            inner: Damped::new(origin, inner_rate),
            scale: Damped::new(1.0, outer_rate.max(0.2)),
            hover_scale: 2.0,
        }
    }

    pub fn with_hover_scale(mut self, scale: f32) -> Self {
        self.hover_scale = scale.max(0.0);
        self
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.outer.set_target(pointer);
        self.inner.set_target(pointer);
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        self.scale.set_target(if hovering { self.hover_scale } else { 1.0 });
    }

    pub fn step(&mut self) {
        self.outer.step();
        self.inner.step();
        self.scale.step();
    }
}

/// Pixels a layer of speed 1 travels when the pointer sits on a viewport edge.
pub const PARALLAX_TRAVEL: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxLayer {
    pub speed: f32,
    pub offset: Damped<Vec2>,
}

/// Pointer parallax: every layer eases toward `pointer_ndc * speed * PARALLAX_TRAVEL`, where
/// `pointer_ndc` is the pointer mapped to [-1, 1] around the viewport center.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallaxLayers {
    layers: Vec<ParallaxLayer>,
}

impl ParallaxLayers {
    pub fn new(speeds: &[f32], rate: f32) -> Self {
        let layers = speeds
            .iter()
            .map(|&speed| ParallaxLayer {
                speed: if speed.is_finite() { speed } else { 0.0 },
                offset: Damped::new(Vec2::ZERO, rate),
            })
            .collect();
        Self { layers }
    }

    /// Retargets every layer. A degenerate viewport leaves the targets where they are.
    pub fn set_pointer(&mut self, pointer: Vec2, viewport: Vec2) {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }
        let ndc = (pointer / viewport - Vec2::splat(0.5)) * 2.0;
        for layer in &mut self.layers {
            layer.offset.set_target(ndc * layer.speed * PARALLAX_TRAVEL);
        }
    }

    pub fn step(&mut self) {
        for layer in &mut self.layers {
            layer.offset.step();
        }
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    pub fn offset(&self, layer: usize) -> Option<Vec2> {
        self.layers.get(layer).map(|layer| layer.offset.current)
    }
}
