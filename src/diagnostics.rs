//! Frame counters and text reports of cache population.

use std::fmt::{self, Write};
use std::hash::Hash;

use crate::backend::GraphicsDevice;
use crate::cache::{GraphicsCache, SlotCache};

/// Per-frame render statistics.
///
/// Advisory only: the renderer resets and bumps these, the reports read them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameCounters {
    pub draw_calls: u32,
    pub triangles: u64,
    pub lines: u64,
    pub fps: f64,
}

impl FrameCounters {
    /// Zero the per-frame counts. The FPS estimate is kept.
    pub fn reset(&mut self) {
        self.draw_calls = 0;
        self.triangles = 0;
        self.lines = 0;
    }

    /// Count one mesh draw of `triangles` triangles.
    pub fn record_mesh_draw(&mut self, triangles: u64) {
        self.draw_calls += 1;
        self.triangles += triangles;
    }

    /// Count one line draw of `lines` line segments.
    pub fn record_line_draw(&mut self, lines: u64) {
        self.draw_calls += 1;
        self.lines += lines;
    }

    /// Update the FPS estimate from the last frame's duration in seconds.
    pub fn set_frame_time(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.fps = 1.0 / seconds;
        }
    }
}

fn write_counters(out: &mut String, counters: &FrameCounters) -> fmt::Result {
    writeln!(out, "FPS - {:.2}", counters.fps)?;
    writeln!(out, "Draw Calls - {}", counters.draw_calls)?;
    writeln!(out, "Triangles - {}", counters.triangles)?;
    writeln!(out, "Lines - {}", counters.lines)
}

fn write_entries<K, H>(out: &mut String, title: &str, cache: &SlotCache<K, H>) -> fmt::Result
where
    K: Eq + Hash + fmt::Display,
    H: Clone,
{
    writeln!(out, "Unique {} - {}x", title, cache.len())?;
    for (key, _, users) in cache.iter() {
        writeln!(out, " {}x {}", users, key)?;
    }
    Ok(())
}

fn render_short<D: GraphicsDevice>(cache: &GraphicsCache<D>, out: &mut String) -> fmt::Result {
    write_counters(out, cache.counters())?;
    writeln!(out, "Unique VAOs - {}x", cache.buffers().len())?;
    writeln!(out, "Unique Textures - {}x", cache.textures().len())?;
    writeln!(out, "Unique Shader Programs - {}x", cache.programs().len())
}

fn render_full<D: GraphicsDevice>(cache: &GraphicsCache<D>, out: &mut String) -> fmt::Result {
    write_counters(out, cache.counters())?;
    write_entries(out, "VAOs", cache.buffers())?;
    write_entries(out, "Textures", cache.textures())?;
    write_entries(out, "Vertex Shaders", cache.vertex_shaders())?;
    write_entries(out, "Fragment Shaders", cache.fragment_shaders())?;
    write_entries(out, "Shader Programs", cache.programs())?;
    writeln!(out, "Shader Program Users - {}x", cache.programs().total_refs())
}

/// Frame counters plus the number of distinct buffer sets, textures and programs.
pub fn short_report<D: GraphicsDevice>(cache: &GraphicsCache<D>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = render_short(cache, &mut out);
    out
}

/// Frame counters plus every cached key with its reference count.
pub fn full_report<D: GraphicsDevice>(cache: &GraphicsCache<D>) -> String {
    let mut out = String::new();
    let _ = render_full(cache, &mut out);
    out
}
