//! Headless renderer that tallies what would have been drawn

use super::Renderer;
use super::draw::{DrawCmd, DrawList};
use super::shapes;
use super::vertex::Vertex;
use crate::assets::SpriteSheet;

/// Counts frames, commands and tessellated vertices without a GPU
#[derive(Debug, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub last_commands: usize,
    pub last_vertices: usize,
    pub last_texts: Vec<String>,
    sprites: SpriteSheet,
    scratch: Vec<Vertex>,
}

impl FrameStats {
    pub fn new(sprites: SpriteSheet) -> Self {
        Self {
            sprites,
            ..Default::default()
        }
    }
}

impl Renderer for FrameStats {
    fn present(&mut self, frame: &DrawList) {
        self.scratch.clear();
        shapes::tessellate(frame, &self.sprites, &mut self.scratch);

        self.frames += 1;
        self.last_commands = frame.len();
        self.last_vertices = self.scratch.len();
        self.last_texts = frame
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();

        log::trace!(
            "Frame {}: {} commands, {} vertices",
            self.frames,
            self.last_commands,
            self.last_vertices
        );
    }
}
