//! # Batch — Collect, Sort, and Merge Sprites into Draw Calls
//!
//! This module is the CPU-side heart of the 2D renderer. Each frame the
//! caller opens a cycle with [`SpriteBatch::begin`], submits any number of
//! quads with [`SpriteBatch::draw`], and closes it with [`SpriteBatch::end`].
//! Closing the cycle:
//!
//! 1. stable-sorts the submitted glyphs by the cycle's [`SortMode`]
//! 2. walks the sorted list once, emitting six vertices per glyph and
//!    starting a new [`RenderBatch`] only where the texture changes
//! 3. hands the whole vertex stream to the upload collaborator in one call
//!
//! [`SpriteBatch::render_batch`] then issues one bind + one draw per batch.
//!
//! ## Why Sort First
//!
//! Merging only looks at neighbours, so the number of batches is the number
//! of texture changes in the final order plus one. Submission order
//! `[A, B, A, B]` gives four batches; sorted by texture it gives two. That
//! is why [`SortMode::Texture`] is the default: an O(n log n) sort buys an
//! O(n) merge that yields at most one batch per distinct texture. The depth
//! modes trade batch count for ordering guarantees (early-z for opaque
//! sprites, correct compositing for blended ones).
//!
//! All sorts are stable: glyphs with equal keys keep their submission
//! order, so ties in depth composite deterministically.
//!
//! ## Storage
//!
//! Glyphs live in one `Vec` owned by the batch, sorted in place by value.
//! `begin` clears it without releasing capacity, so steady-state frames do
//! not allocate.
//!
//! ## Winding
//!
//! ```text
//!   top_left ──── top_right        triangle 1: top_left, bottom_left, bottom_right
//!      │  ╲            │           triangle 2: bottom_right, top_right, top_left
//!      │     ╲         │
//!   bottom_left ── bottom_right
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::texture::TextureHandle;
use super::vertex::Vertex;
use super::Color;
use crate::math::Rect;

/// Vertices emitted per quad: two triangles, no index buffer.
pub const VERTICES_PER_QUAD: u32 = 6;

/// Receives the finished vertex stream at the end of a cycle.
///
/// Called exactly once per [`SpriteBatch::end`], with the complete stream
/// (possibly empty). Implementations replace whatever they held before.
pub trait VertexUpload {
    fn upload(&mut self, vertices: &[Vertex]);
}

/// Issues the per-batch GPU commands for [`SpriteBatch::render_batch`].
pub trait BatchDraw {
    fn bind_texture(&mut self, texture: TextureHandle);
    /// Draw a range of the most recently uploaded vertex stream.
    fn draw(&mut self, vertices: Range<u32>);
}

/// How glyphs are ordered before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Submission order.
    None,
    /// Depth ascending.
    FrontToBack,
    /// Depth descending.
    BackToFront,
    /// Texture handle descending. Fewest batches.
    #[default]
    Texture,
}

/// A contiguous run of vertices that share one texture. One draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderBatch {
    pub offset: u32,
    pub num_vertices: u32,
    pub texture: TextureHandle,
}

impl RenderBatch {
    pub fn vertex_range(&self) -> Range<u32> {
        self.offset..self.offset + self.num_vertices
    }
}

/// One submitted quad. Corners are resolved at submission time.
#[derive(Debug, Clone, Copy)]
struct Glyph {
    texture: TextureHandle,
    depth: f32,
    top_left: Vertex,
    bottom_left: Vertex,
    bottom_right: Vertex,
    top_right: Vertex,
}

impl Glyph {
    fn new(dest: Rect, uv: Rect, texture: TextureHandle, depth: f32, color: Color) -> Self {
        let (x0, y0) = (dest.x, dest.y);
        let (x1, y1) = (dest.x + dest.w, dest.y + dest.h);
        let (u0, v0) = (uv.x, uv.y);
        let (u1, v1) = (uv.x + uv.w, uv.y + uv.h);

        Self {
            texture,
            depth,
            top_left: Vertex::new(x0, y1, color, u0, v1),
            bottom_left: Vertex::new(x0, y0, color, u0, v0),
            bottom_right: Vertex::new(x1, y0, color, u1, v0),
            top_right: Vertex::new(x1, y1, color, u1, v1),
        }
    }

    fn triangles(&self) -> [Vertex; VERTICES_PER_QUAD as usize] {
        [
            self.top_left,
            self.bottom_left,
            self.bottom_right,
            self.bottom_right,
            self.top_right,
            self.top_left,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Drawing,
    Finished,
}

/// Accumulates quads for one frame and turns them into texture batches.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    sort_mode: SortMode,
    phase: Phase,
    glyphs: Vec<Glyph>,
    vertices: Vec<Vertex>,
    batches: Vec<RenderBatch>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle. Drops everything retained from the previous one.
    pub fn begin(&mut self, sort_mode: SortMode) {
        self.sort_mode = sort_mode;
        self.glyphs.clear();
        self.vertices.clear();
        self.batches.clear();
        self.phase = Phase::Drawing;
    }

    /// Queue one quad. No GPU work happens here.
    ///
    /// `dest` is in world units, `uv` in texture space. `depth` is only a
    /// sort key; it does not reach the GPU.
    pub fn draw(&mut self, dest: Rect, uv: Rect, texture: TextureHandle, depth: f32, color: Color) {
        if self.phase != Phase::Drawing {
            debug_assert!(false, "SpriteBatch::draw called outside begin/end");
            log::warn!("SpriteBatch::draw called outside begin/end; quad dropped");
            return;
        }
        self.glyphs.push(Glyph::new(dest, uv, texture, depth, color));
    }

    /// Close the cycle: sort, merge into batches, and upload the vertices.
    ///
    /// An empty cycle is valid and uploads an empty stream.
    pub fn end(&mut self, upload: &mut impl VertexUpload) {
        if self.phase != Phase::Drawing {
            debug_assert!(false, "SpriteBatch::end called without begin");
            log::warn!("SpriteBatch::end called without begin");
        }

        self.sort_glyphs();
        self.create_render_batches();
        self.glyphs.clear();
        self.phase = Phase::Finished;

        log::trace!(
            "sprite batch: {} quads in {} batches ({:?})",
            self.quad_count(),
            self.batches.len(),
            self.sort_mode
        );

        upload.upload(&self.vertices);
    }

    /// Bind and draw every batch, in order.
    ///
    /// Leaves the last batch's texture bound; callers should not rely on any
    /// particular texture binding afterwards.
    pub fn render_batch(&self, target: &mut impl BatchDraw) {
        for batch in &self.batches {
            target.bind_texture(batch.texture);
            target.draw(batch.vertex_range());
        }
    }

    /// The batches built by the last [`end`](Self::end).
    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    /// The vertex stream built by the last [`end`](Self::end).
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Quads in the last finished cycle.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD as usize
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    fn sort_glyphs(&mut self) {
        // `sort_by` is a stable merge sort; equal keys keep submission order.
        match self.sort_mode {
            SortMode::None => {}
            SortMode::FrontToBack => self.glyphs.sort_by(|a, b| a.depth.total_cmp(&b.depth)),
            SortMode::BackToFront => self.glyphs.sort_by(|a, b| b.depth.total_cmp(&a.depth)),
            SortMode::Texture => self.glyphs.sort_by(|a, b| b.texture.cmp(&a.texture)),
        }
    }

    fn create_render_batches(&mut self) {
        self.vertices
            .reserve(self.glyphs.len() * VERTICES_PER_QUAD as usize);

        for glyph in &self.glyphs {
            let offset = self.vertices.len() as u32;
            self.vertices.extend_from_slice(&glyph.triangles());

            match self.batches.last_mut() {
                Some(last) if last.texture == glyph.texture => {
                    last.num_vertices += VERTICES_PER_QUAD;
                }
                _ => self.batches.push(RenderBatch {
                    offset,
                    num_vertices: VERTICES_PER_QUAD,
                    texture: glyph.texture,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what the batch uploaded.
    #[derive(Default)]
    struct RecordingUpload {
        uploads: Vec<Vec<Vertex>>,
    }

    impl VertexUpload for RecordingUpload {
        fn upload(&mut self, vertices: &[Vertex]) {
            self.uploads.push(vertices.to_vec());
        }
    }

    #[derive(Debug, PartialEq)]
    enum Command {
        Bind(TextureHandle),
        Draw(Range<u32>),
    }

    #[derive(Default)]
    struct RecordingDraw {
        commands: Vec<Command>,
    }

    impl BatchDraw for RecordingDraw {
        fn bind_texture(&mut self, texture: TextureHandle) {
            self.commands.push(Command::Bind(texture));
        }

        fn draw(&mut self, vertices: Range<u32>) {
            self.commands.push(Command::Draw(vertices));
        }
    }

    const A: TextureHandle = TextureHandle(1);
    const B: TextureHandle = TextureHandle(2);
    const C: TextureHandle = TextureHandle(3);

    /// Draw a unit quad at `x` so each glyph is identifiable by position.
    fn quad_at(batch: &mut SpriteBatch, x: f32, texture: TextureHandle, depth: f32) {
        batch.draw(
            Rect::new(x, 0.0, 1.0, 1.0),
            Rect::FULL_UV,
            texture,
            depth,
            Color::WHITE,
        );
    }

    fn run(mode: SortMode, quads: &[(TextureHandle, f32)]) -> SpriteBatch {
        let mut batch = SpriteBatch::new();
        batch.begin(mode);
        for (i, &(texture, depth)) in quads.iter().enumerate() {
            quad_at(&mut batch, i as f32, texture, depth);
        }
        batch.end(&mut RecordingUpload::default());
        batch
    }

    /// Submission index of each quad in final order (bottom-left x).
    fn order(batch: &SpriteBatch) -> Vec<usize> {
        batch
            .vertices()
            .chunks(VERTICES_PER_QUAD as usize)
            .map(|quad| quad[1].position[0] as usize)
            .collect()
    }

    fn texture_transitions(textures: &[TextureHandle]) -> usize {
        textures.windows(2).filter(|w| w[0] != w[1]).count()
    }

    #[test]
    fn texture_sort_merges_interleaved_textures() {
        let batch = run(SortMode::Texture, &[(A, 0.0), (B, 0.0), (A, 0.0), (B, 0.0)]);
        assert_eq!(
            batch.batches(),
            &[
                RenderBatch { offset: 0, num_vertices: 12, texture: B },
                RenderBatch { offset: 12, num_vertices: 12, texture: A },
            ]
        );
    }

    #[test]
    fn single_texture_unsorted_is_one_batch() {
        let batch = run(SortMode::None, &[(A, 0.0), (A, 0.0), (A, 0.0)]);
        assert_eq!(
            batch.batches(),
            &[RenderBatch { offset: 0, num_vertices: 18, texture: A }]
        );
    }

    #[test]
    fn empty_cycle_uploads_nothing_and_draws_nothing() {
        let mut batch = SpriteBatch::new();
        let mut upload = RecordingUpload::default();
        batch.begin(SortMode::Texture);
        batch.end(&mut upload);

        assert_eq!(upload.uploads, vec![Vec::<Vertex>::new()]);
        assert!(batch.batches().is_empty());

        let mut draw = RecordingDraw::default();
        batch.render_batch(&mut draw);
        assert!(draw.commands.is_empty());
    }

    #[test]
    fn unsorted_batch_count_follows_transitions() {
        let textures = [A, A, B, C, C, A, B, B, A];
        let quads: Vec<_> = textures.iter().map(|&t| (t, 0.0)).collect();
        let batch = run(SortMode::None, &quads);
        assert_eq!(batch.batches().len(), texture_transitions(&textures) + 1);
    }

    #[test]
    fn texture_sort_never_exceeds_distinct_textures() {
        let textures = [C, A, B, A, C, B, B, A, C, C, A];
        let quads: Vec<_> = textures.iter().map(|&t| (t, 0.0)).collect();
        let batch = run(SortMode::Texture, &quads);
        assert_eq!(batch.batches().len(), 3);
        let order: Vec<_> = batch.batches().iter().map(|b| b.texture).collect();
        assert_eq!(order, vec![C, B, A]);
    }

    #[test]
    fn vertex_count_is_six_per_quad() {
        for n in [0usize, 1, 2, 7, 64] {
            let quads: Vec<_> = (0..n)
                .map(|i| (if i % 3 == 0 { A } else { B }, i as f32))
                .collect();
            for mode in [SortMode::None, SortMode::Texture, SortMode::FrontToBack, SortMode::BackToFront] {
                let batch = run(mode, &quads);
                assert_eq!(batch.vertices().len(), 6 * n, "{mode:?} with {n} quads");
                let batched: u32 = batch.batches().iter().map(|b| b.num_vertices).sum();
                assert_eq!(batched as usize, 6 * n);
            }
        }
    }

    #[test]
    fn batches_tile_the_vertex_stream() {
        let batch = run(SortMode::None, &[(A, 0.0), (B, 0.0), (B, 0.0), (A, 0.0), (C, 0.0)]);
        let mut next = 0;
        for b in batch.batches() {
            assert_eq!(b.offset, next);
            assert_eq!(b.num_vertices % VERTICES_PER_QUAD, 0);
            next += b.num_vertices;
        }
        assert_eq!(next as usize, batch.vertices().len());
    }

    #[test]
    fn adjacent_batches_never_share_a_texture() {
        let batch = run(SortMode::None, &[(A, 0.0), (A, 0.0), (B, 0.0), (A, 0.0), (A, 0.0), (C, 0.0)]);
        for pair in batch.batches().windows(2) {
            assert_ne!(pair[0].texture, pair[1].texture);
        }
        assert_eq!(batch.batches().len(), 4);
    }

    #[test]
    fn each_quad_lands_in_the_batch_of_its_texture() {
        let quads = [(B, 0.0), (A, 0.0), (A, 0.0), (C, 0.0), (B, 0.0)];
        let batch = run(SortMode::None, &quads);
        for b in batch.batches() {
            for quad in b.offset / 6..(b.offset + b.num_vertices) / 6 {
                let submitted = order(&batch)[quad as usize];
                assert_eq!(quads[submitted].0, b.texture);
            }
        }
    }

    #[test]
    fn none_preserves_submission_order() {
        let batch = run(SortMode::None, &[(C, 3.0), (A, 1.0), (B, 2.0)]);
        assert_eq!(order(&batch), vec![0, 1, 2]);
    }

    #[test]
    fn front_to_back_sorts_depth_ascending() {
        let batch = run(SortMode::FrontToBack, &[(A, 3.0), (A, -1.0), (A, 2.0)]);
        assert_eq!(order(&batch), vec![1, 2, 0]);
    }

    #[test]
    fn back_to_front_sorts_depth_descending() {
        let batch = run(SortMode::BackToFront, &[(A, 3.0), (A, -1.0), (A, 2.0)]);
        assert_eq!(order(&batch), vec![0, 2, 1]);
    }

    #[test]
    fn sorts_are_stable_on_equal_keys() {
        // Every quad has the same texture and depth: any reordering is a bug.
        let quads = [(B, 1.0); 8];
        for mode in [SortMode::None, SortMode::Texture, SortMode::FrontToBack, SortMode::BackToFront] {
            let batch = run(mode, &quads);
            assert_eq!(order(&batch), (0..8).collect::<Vec<_>>(), "{mode:?}");
        }
    }

    #[test]
    fn stability_holds_within_mixed_keys() {
        let quads = [(A, 1.0), (B, 0.0), (A, 0.0), (B, 1.0), (A, 1.0), (B, 0.0)];

        let by_texture = run(SortMode::Texture, &quads);
        assert_eq!(order(&by_texture), vec![1, 3, 5, 0, 2, 4]);

        let front = run(SortMode::FrontToBack, &quads);
        assert_eq!(order(&front), vec![1, 2, 5, 0, 3, 4]);

        let back = run(SortMode::BackToFront, &quads);
        assert_eq!(order(&back), vec![0, 3, 4, 1, 2, 5]);
    }

    #[test]
    fn quad_corners_follow_rects() {
        let mut batch = SpriteBatch::new();
        batch.begin(SortMode::None);
        batch.draw(
            Rect::new(10.0, 20.0, 30.0, 40.0),
            Rect::new(0.25, 0.5, 0.25, 0.5),
            A,
            0.0,
            Color::RED,
        );
        batch.end(&mut RecordingUpload::default());

        let v = batch.vertices();
        let top_left = Vertex::new(10.0, 60.0, Color::RED, 0.25, 1.0);
        let bottom_left = Vertex::new(10.0, 20.0, Color::RED, 0.25, 0.5);
        let bottom_right = Vertex::new(40.0, 20.0, Color::RED, 0.5, 0.5);
        let top_right = Vertex::new(40.0, 60.0, Color::RED, 0.5, 1.0);
        assert_eq!(
            v,
            &[top_left, bottom_left, bottom_right, bottom_right, top_right, top_left]
        );
    }

    #[test]
    fn render_batch_binds_before_each_draw() {
        let batch = run(SortMode::None, &[(A, 0.0), (A, 0.0), (B, 0.0), (A, 0.0)]);
        let mut draw = RecordingDraw::default();
        batch.render_batch(&mut draw);
        assert_eq!(
            draw.commands,
            vec![
                Command::Bind(A),
                Command::Draw(0..12),
                Command::Bind(B),
                Command::Draw(12..18),
                Command::Bind(A),
                Command::Draw(18..24),
            ]
        );
    }

    #[test]
    fn end_uploads_the_stream_once() {
        let mut batch = SpriteBatch::new();
        let mut upload = RecordingUpload::default();
        batch.begin(SortMode::Texture);
        quad_at(&mut batch, 0.0, A, 0.0);
        quad_at(&mut batch, 1.0, B, 0.0);
        batch.end(&mut upload);

        assert_eq!(upload.uploads.len(), 1);
        assert_eq!(upload.uploads[0].as_slice(), batch.vertices());
    }

    #[test]
    fn begin_discards_previous_cycle() {
        let mut batch = SpriteBatch::new();
        let mut upload = RecordingUpload::default();

        batch.begin(SortMode::None);
        for i in 0..5 {
            quad_at(&mut batch, i as f32, A, 0.0);
        }
        batch.end(&mut upload);
        assert_eq!(batch.quad_count(), 5);

        batch.begin(SortMode::BackToFront);
        quad_at(&mut batch, 0.0, B, 0.0);
        batch.end(&mut upload);

        assert_eq!(batch.quad_count(), 1);
        assert_eq!(batch.sort_mode(), SortMode::BackToFront);
        assert_eq!(
            batch.batches(),
            &[RenderBatch { offset: 0, num_vertices: 6, texture: B }]
        );
        assert_eq!(upload.uploads[1].len(), 6);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside begin/end")]
    fn draw_after_end_is_caught_in_debug() {
        let mut batch = SpriteBatch::new();
        batch.begin(SortMode::None);
        batch.end(&mut RecordingUpload::default());
        quad_at(&mut batch, 0.0, A, 0.0);
    }

    #[test]
    fn sort_mode_deserializes_snake_case() {
        let mode: SortMode = serde_json::from_str("\"back_to_front\"").unwrap();
        assert_eq!(mode, SortMode::BackToFront);
        assert_eq!(SortMode::default(), SortMode::Texture);
    }
}
