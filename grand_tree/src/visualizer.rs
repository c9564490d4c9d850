//! Software-rendered viewer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ GRAND TREE                                 [ FORMED ███ ]│
//! │                                                          │
//! │        · stars ·        ✦ sparkles                       │
//! │                  foliage cloud / tree                    │
//! │              ornaments ●   ▭ photo cards                 │
//! │                                                          │
//! │ status text                              polls / skipped │
//! │ key legend                                               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Draw order: backdrop, additive foliage, then ornaments and cards
//! back-to-front, then vignette + grain, then the HUD.

use std::sync::mpsc::Sender;
use std::time::Duration;

use formation_core::{CameraPose, FrameContext, PopulationKind, Scene, StarField};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use nalgebra::{Isometry3, Perspective3, Point3, UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::state_label;
use crate::config::WindowConfig;
use crate::error::AppError;
use crate::gesture::{SimInput, SimKey};
use crate::poller::PollStats;

// ════════════════════════════════════════════════════════════════════════════
// Palette + layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:      u32 = 0xFF000A06;
const HUD_BG:        u32 = 0xFF05140D;
const GOLD:          u32 = 0xFFFFD700;
const WINE:          u32 = 0xFF800020;
const TEXT_COLOR:    u32 = 0xFFEEEEDD;
const LEGEND_COLOR:  u32 = 0xFF888877;
const SPARKLE_COLOR: u32 = 0xFFFFE9A0;
const STATUS_H:      usize = 44;
const NEAR:          f32 = 0.1;
const FAR:           f32 = 1000.0;
const GRAIN_SIZE:    usize = 128;

/// Photo tints, one per card slot.
const PHOTO_TINTS: [u32; 6] = [
    0xFF8C5A3C, 0xFF3C6E8C, 0xFF6E8C3C, 0xFF8C3C6E, 0xFFB08850, 0xFF507890,
];

/// Card face half-extents in world units (before per-card scale).
const CARD_HALF_W: f32 = 0.5;
const CARD_HALF_H: f32 = 0.6;

// ════════════════════════════════════════════════════════════════════════════
// Frame: everything one render needs
// ════════════════════════════════════════════════════════════════════════════

pub struct Frame<'a> {
    pub scene:  &'a Scene,
    pub ctx:    &'a FrameContext,
    pub status: &'a str,
    pub busy:   bool,
    pub stats:  PollStats,
}

// ════════════════════════════════════════════════════════════════════════════
// Projector
// ════════════════════════════════════════════════════════════════════════════

/// A world point on screen.  `depth` is the distance along the view axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x:     f32,
    pub y:     f32,
    pub depth: f32,
}

/// World → pixel mapping for one frame.
pub struct Projector {
    view:   Isometry3<f32>,
    proj:   Perspective3<f32>,
    width:  f32,
    height: f32,
    focal:  f32,
}

impl Projector {
    pub fn new(pose: &CameraPose, fov_deg: f32, width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height.max(1) as f32);
        let fovy = fov_deg.to_radians();
        Projector {
            view:   pose.view(),
            proj:   Perspective3::new(w / h, fovy, NEAR, FAR),
            width:  w,
            height: h,
            focal:  h * 0.5 / (fovy * 0.5).tan(),
        }
    }

    /// `None` when the point is behind the near plane.
    pub fn project(&self, p: &Vector3<f32>) -> Option<Projected> {
        let v = self.view.transform_point(&Point3::from(*p));
        let depth = -v.z;
        if depth <= NEAR { return None; }
        let ndc = self.proj.project_point(&v);
        Some(Projected {
            x: (ndc.x + 1.0) * 0.5 * self.width,
            y: (1.0 - ndc.y) * 0.5 * self.height,
            depth,
        })
    }

    /// On-screen size of `world` units at `depth`.
    pub fn pixels(&self, world: f32, depth: f32) -> f32 {
        world * self.focal / depth.max(NEAR)
    }

    /// View-space position of the camera in world coordinates.
    pub fn eye(&self) -> Point3<f32> {
        self.view.inverse_transform_point(&Point3::origin())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas: ARGB framebuffer with drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf: Vec<u32>,
    pub w:   usize,
    pub h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; w * h], w, h }
    }

    pub fn clear(&mut self, color: u32) { self.buf.fill(color); }

    pub fn get(&self, x: usize, y: usize) -> u32 { self.buf[y * self.w + x] }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x + w).min(self.w) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(self.h) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    /// Additive blend of `color` scaled by `intensity`.
    pub fn add_pixel(&mut self, x: i32, y: i32, color: u32, intensity: f32) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h { return; }
        let i = y as usize * self.w + x as usize;
        self.buf[i] = add(self.buf[i], color, intensity);
    }

    /// Alpha-blended pixel.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h { return; }
        let i = y as usize * self.w + x as usize;
        self.buf[i] = blend(self.buf[i], color, alpha);
    }

    /// Soft additive disc, brightest in the middle.
    pub fn splat(&mut self, cx: f32, cy: f32, r: f32, color: u32, intensity: f32) {
        if r <= 0.75 {
            self.add_pixel(cx as i32, cy as i32, color, intensity);
            return;
        }
        let ri = r.ceil() as i32;
        let (x0, y0) = (cx as i32, cy as i32);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                let d = ((dx * dx + dy * dy) as f32).sqrt() / r;
                if d <= 1.0 {
                    self.add_pixel(x0 + dx, y0 + dy, color, intensity * (1.0 - d * d));
                }
            }
        }
    }

    /// Solid disc with a highlight toward the top-left.
    pub fn fill_sphere(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.ceil().max(1.0) as i32;
        let (x0, y0) = (cx as i32, cy as i32);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                let (fx, fy) = (dx as f32 / r, dy as f32 / r);
                let d2 = fx * fx + fy * fy;
                if d2 > 1.0 { continue; }
                let shade = 0.55 + 0.45 * (1.0 - d2).sqrt();
                let glint = ((fx + 0.4).powi(2) + (fy + 0.4).powi(2)).sqrt();
                let mut c = scale(color, shade);
                if glint < 0.3 {
                    c = blend(c, 0xFFFFFFFF, (0.3 - glint) / 0.3 * 0.8);
                }
                self.blend_pixel(x0 + dx, y0 + dy, c, 1.0);
            }
        }
    }

    /// Fill a convex polygon given in either winding.
    pub fn fill_convex(&mut self, pts: &[(f32, f32)], color: u32) {
        if pts.len() < 3 { return; }
        let min_x = pts.iter().map(|p| p.0).fold(f32::INFINITY, f32::min).max(0.0);
        let max_x = pts.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max).min(self.w as f32 - 1.0);
        let min_y = pts.iter().map(|p| p.1).fold(f32::INFINITY, f32::min).max(0.0);
        let max_y = pts.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max).min(self.h as f32 - 1.0);
        if min_x > max_x || min_y > max_y { return; }

        for y in min_y as usize..=max_y as usize {
            for x in min_x as usize..=max_x as usize {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let (mut pos, mut neg) = (false, false);
                for i in 0..pts.len() {
                    let (ax, ay) = pts[i];
                    let (bx, by) = pts[(i + 1) % pts.len()];
                    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
                    if cross > 0.0 { pos = true; } else if cross < 0.0 { neg = true; }
                }
                if !(pos && neg) {
                    self.buf[y * self.w + x] = color;
                }
            }
        }
    }

    pub fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in 0..=r as isize {
            let dx = r as isize - dy;
            for &(sx, sy) in &[
                (cx as isize + dx, cy as isize + dy),
                (cx as isize - dx, cy as isize + dy),
                (cx as isize + dx, cy as isize - dy),
                (cx as isize - dx, cy as isize - dy),
            ] {
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.w { break; }
        }
    }
}

/// Pixel width of `text` at `scale`.
pub fn label_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale.max(1)
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:   Window,
    canvas:   Canvas,
    sim_tx:   Sender<SimInput>,
    pointer:  Option<(f32, f32)>,
    postfx:   bool,
    vignette: Vec<f32>,
    grain:    Vec<i16>,
    rng:      StdRng,
}

impl Visualizer {
    pub fn new(cfg: &WindowConfig, sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Grand Tree - gesture controlled",
            cfg.width, cfg.height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        let fps = u64::from(cfg.fps.max(1));
        window.limit_update_rate(Some(Duration::from_micros(1_000_000 / fps)));

        let mut rng = StdRng::from_entropy();
        let grain = (0..GRAIN_SIZE * GRAIN_SIZE).map(|_| rng.gen_range(-10i16..=10)).collect();

        Ok(Visualizer {
            window,
            canvas:   Canvas::new(cfg.width, cfg.height),
            sim_tx,
            pointer:  None,
            postfx:   cfg.postfx,
            vignette: vignette_table(cfg.width, cfg.height),
            grain,
            rng,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Translate keys and pointer into [`SimInput`].  Returns false when the
    /// window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if one_shot(Key::Q) || one_shot(Key::Escape) { return false; }

        let mut keys = Vec::new();
        if one_shot(Key::O) { keys.push(SimKey::OpenHand); }
        if one_shot(Key::C) { keys.push(SimKey::ClosedHand); }
        if one_shot(Key::N) { keys.push(SimKey::NoHand); }
        for key in keys {
            let _ = self.sim_tx.send(SimInput::KeyDown(key));
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let p = (mx / self.canvas.w as f32, my / self.canvas.h as f32);
            if self.pointer != Some(p) {
                self.pointer = Some(p);
                let _ = self.sim_tx.send(SimInput::Pointer { x: p.0, y: p.1 });
            }
        }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &Frame<'_>) -> Result<(), AppError> {
        let (w, h) = (self.canvas.w, self.canvas.h);
        let proj = Projector::new(&frame.ctx.camera, frame.scene.fov_deg(), w, h);

        self.canvas.clear(BG_COLOR);
        draw_backdrop(&mut self.canvas, &proj, frame);
        draw_foliage(&mut self.canvas, &proj, frame);
        draw_solids(&mut self.canvas, &proj, frame);

        if self.postfx {
            let offset = (self.rng.gen_range(0..GRAIN_SIZE), self.rng.gen_range(0..GRAIN_SIZE));
            apply_postfx(&mut self.canvas, &self.vignette, &self.grain, offset);
        }

        draw_hud(&mut self.canvas, frame);

        self.window
            .update_with_buffer(&self.canvas.buf, w, h)
            .map_err(|e| AppError::Window(e.to_string()))
    }
}

// ── Scene layers ─────────────────────────────────────────────────────────

fn draw_backdrop(canvas: &mut Canvas, proj: &Projector, frame: &Frame<'_>) {
    let t = frame.ctx.elapsed;
    for star in &frame.scene.stars().stars {
        if let Some(p) = proj.project(&star.position) {
            let k = StarField::twinkle(star, t);
            canvas.add_pixel(p.x as i32, p.y as i32, 0xFFFFFFFF, 0.6 * k);
        }
    }

    let sparkles = frame.scene.sparkles();
    for mote in &sparkles.motes {
        if let Some(p) = proj.project(&sparkles.position(mote, t)) {
            let r = proj.pixels(0.05, p.depth).clamp(0.5, 2.5);
            canvas.splat(p.x, p.y, r, SPARKLE_COLOR, 0.8 * sparkles.flicker(mote, t));
        }
    }
}

fn draw_foliage(canvas: &mut Canvas, proj: &Projector, frame: &Frame<'_>) {
    for t in frame.scene.transforms(PopulationKind::Foliage, frame.ctx) {
        if let Some(p) = proj.project(&t.position) {
            let r = proj.pixels(t.point_size * 0.012, p.depth).clamp(0.5, 4.0);
            canvas.splat(p.x, p.y, r, 0xFF000000 | t.color, 0.55 * t.alpha);
        }
    }
}

enum Solid {
    Ornament { x: f32, y: f32, r: f32, color: u32 },
    Card     { corners: [(f32, f32); 4], photo: [(f32, f32); 4], front: bool, tint: u32 },
}

/// Ornaments and cards, painter-sorted back to front.
fn draw_solids(canvas: &mut Canvas, proj: &Projector, frame: &Frame<'_>) {
    let mut solids: Vec<(f32, Solid)> = Vec::new();

    for t in frame.scene.transforms(PopulationKind::Ornament, frame.ctx) {
        if let Some(p) = proj.project(&t.position) {
            let r = proj.pixels(t.scale, p.depth).max(1.0);
            solids.push((p.depth, Solid::Ornament { x: p.x, y: p.y, r, color: 0xFF000000 | t.color }));
        }
    }

    let eye = proj.eye().coords;
    let cards = &frame.scene.population(PopulationKind::Card).records;
    for (t, record) in frame.scene.transforms(PopulationKind::Card, frame.ctx).zip(cards) {
        let Some(centre) = proj.project(&t.position) else { continue };
        let quad = |hw: f32, top: f32, bottom: f32| -> Option<[(f32, f32); 4]> {
            let local = [(-hw, top), (hw, top), (hw, bottom), (-hw, bottom)];
            let mut out = [(0.0, 0.0); 4];
            for (o, (lx, ly)) in out.iter_mut().zip(local) {
                let world = t.position + card_offset(&t.orientation, lx * t.scale, ly * t.scale);
                let p = proj.project(&world)?;
                *o = (p.x, p.y);
            }
            Some(out)
        };
        let (Some(corners), Some(photo)) = (
            quad(CARD_HALF_W, CARD_HALF_H, -CARD_HALF_H),
            quad(CARD_HALF_W * 0.85, CARD_HALF_H * 0.85, -CARD_HALF_H * 0.45),
        ) else { continue };

        let normal = t.orientation * Vector3::z();
        let front = normal.dot(&(eye - t.position)) > 0.0;
        let tint = PHOTO_TINTS[record.slot % PHOTO_TINTS.len()];
        solids.push((centre.depth, Solid::Card { corners, photo, front, tint }));
    }

    solids.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, solid) in solids {
        match solid {
            Solid::Ornament { x, y, r, color } => canvas.fill_sphere(x, y, r, color),
            Solid::Card { corners, photo, front, tint } => {
                canvas.fill_convex(&corners, 0xFFFFFFF0);
                if front { canvas.fill_convex(&photo, tint); }
            }
        }
    }
}

fn card_offset(orientation: &UnitQuaternion<f32>, x: f32, y: f32) -> Vector3<f32> {
    orientation * Vector3::new(x, y, 0.0)
}

// ── Post-processing ──────────────────────────────────────────────────────

/// Per-pixel darkening factor, 1.0 at the centre.
fn vignette_table(w: usize, h: usize) -> Vec<f32> {
    let (cx, cy) = (w as f32 * 0.5, h as f32 * 0.5);
    let norm = (cx * cx + cy * cy).sqrt().max(1.0);
    (0..w * h).map(|i| {
        let (x, y) = ((i % w) as f32 + 0.5, (i / w) as f32 + 0.5);
        let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / norm;
        (1.0 - 0.6 * d * d).clamp(0.0, 1.0)
    }).collect()
}

fn apply_postfx(canvas: &mut Canvas, vignette: &[f32], grain: &[i16], offset: (usize, usize)) {
    let w = canvas.w;
    for (i, px) in canvas.buf.iter_mut().enumerate() {
        let (x, y) = (i % w, i / w);
        let g = grain[((y + offset.1) % GRAIN_SIZE) * GRAIN_SIZE + (x + offset.0) % GRAIN_SIZE];
        *px = scale(offset_rgb(*px, g), vignette[i]);
    }
}

// ── HUD ──────────────────────────────────────────────────────────────────

fn draw_hud(canvas: &mut Canvas, frame: &Frame<'_>) {
    let (w, h) = (canvas.w, canvas.h);

    canvas.draw_label("GRAND TREE", 16, 14, GOLD, 3);

    // ── State indicator ──────────────────────────────────────────────────
    let state = frame.ctx.state;
    let accent = if state.is_formed() { GOLD } else { WINE };
    let (bw, bh) = (170usize, 44usize);
    let bx = w.saturating_sub(bw + 16);
    canvas.fill_rect(bx, 12, bw, bh, HUD_BG);
    canvas.draw_border(bx, 12, bw, bh, accent);
    canvas.draw_label(state_label(state), bx + 10, 18, accent, 2);
    let filled = ((bw - 20) as f32 * frame.ctx.progress.clamp(0.0, 1.0)) as usize;
    canvas.draw_border(bx + 10, 38, bw - 20, 10, TEXT_COLOR);
    canvas.fill_rect(bx + 10, 38, filled, 10, accent);

    // ── Hand marker ──────────────────────────────────────────────────────
    let hand = frame.ctx.hand;
    let hx = (hand.x.clamp(0.0, 1.0) * (w - 1) as f32) as usize;
    let hy = (hand.y.clamp(0.0, 1.0) * (h - 1) as f32) as usize;
    canvas.draw_diamond(hx, hy, 5, accent);

    // ── Status bar ───────────────────────────────────────────────────────
    let sy = h.saturating_sub(STATUS_H);
    canvas.fill_rect(0, sy, w, STATUS_H, HUD_BG);
    canvas.draw_label(frame.status, 10, sy + 6, TEXT_COLOR, 2);

    let polls = format!(
        "{}POLLS {}  SKIPPED {}",
        if frame.busy { "* " } else { "" },
        frame.stats.completed,
        frame.stats.skipped,
    );
    let px = w.saturating_sub(label_width(&polls, 1) + 10);
    canvas.draw_label(&polls, px, sy + 10, LEGEND_COLOR, 1);

    canvas.draw_label(
        "O=open hand  C=closed hand  N=no hand  mouse=hand position  Q=quit",
        10, h.saturating_sub(12), LEGEND_COLOR, 1,
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '*' => [0b101, 0b010, 0b111, 0b010, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Color helpers (ARGB)
// ────────────────────────────────────────────────────────────────────────────

fn channels(c: u32) -> [u32; 3] {
    [(c >> 16) & 0xFF, (c >> 8) & 0xFF, c & 0xFF]
}

fn pack([r, g, b]: [u32; 3]) -> u32 {
    0xFF000000 | (r.min(255) << 16) | (g.min(255) << 8) | b.min(255)
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let (ca, cb) = (channels(a), channels(b));
    pack([0, 1, 2].map(|i| (ca[i] as f32 * (1.0 - t) + cb[i] as f32 * t) as u32))
}

/// Saturating additive blend.
fn add(dst: u32, src: u32, intensity: f32) -> u32 {
    let k = intensity.clamp(0.0, 1.0);
    let (cd, cs) = (channels(dst), channels(src));
    pack([0, 1, 2].map(|i| cd[i] + (cs[i] as f32 * k) as u32))
}

fn scale(c: u32, k: f32) -> u32 {
    let k = k.max(0.0);
    pack(channels(c).map(|v| (v as f32 * k) as u32))
}

fn offset_rgb(c: u32, delta: i16) -> u32 {
    pack(channels(c).map(|v| (v as i32 + delta as i32).clamp(0, 255) as u32))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
