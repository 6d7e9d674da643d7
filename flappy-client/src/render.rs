use flappy_core::Renderer;
use flappy_shared::FrameSnapshot;

/// Stands in for a drawing surface: logs a summary of every `every`-th frame.
#[derive(Debug, Clone)]
pub struct LogRenderer {
    every: u64,
    frames: u64,
}

impl LogRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &FrameSnapshot) {
        self.frames += 1;
        if self.frames % self.every != 0 {
            return;
        }

        let target = snapshot
            .active_pillar()
            .map(|p| format!("x={:.3} gap=[{:.3}, {:.3}]", p.x, p.gap_bottom(), p.gap_top()))
            .unwrap_or_else(|| "none".to_string());
        log::info!(
            "tick {:>6} | alive {:>3}/{:<3} | target {}",
            snapshot.tick,
            snapshot.alive_count(),
            snapshot.birds.len(),
            target
        );
        for bird in &snapshot.birds {
            log::trace!(
                "  bird {} at ({:.3}, {:.3}) alive={}",
                bird.id,
                bird.position.x,
                bird.position.y,
                bird.alive
            );
        }
    }
}
