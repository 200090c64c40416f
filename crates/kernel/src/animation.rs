use std::time::{Duration, Instant};

/// Start/stop handle for the per-frame render loop.
///
/// The host drives frames; the loop only decides whether a frame runs and
/// keeps count.
#[derive(Debug, Clone, Default)]
pub struct AnimationLoop {
    started_at: Option<Instant>,
    frames: u64,
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin running frames. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(Instant::now());
        tracing::info!("animation loop started");
        true
    }

    /// Stop running frames. Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        if self.started_at.is_none() {
            return false;
        }
        tracing::info!(
            frames = self.frames,
            elapsed_ms = self.elapsed().as_millis() as u64,
            "animation loop stopped"
        );
        self.started_at = None;
        true
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Frames rendered since creation, across restarts.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Time since the current run started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub(crate) fn record_frame(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_stop_cycle() {
        let mut anim = AnimationLoop::new();
        assert!(!anim.is_running());
        assert!(anim.start());
        assert!(!anim.start());
        assert!(anim.is_running());
        anim.record_frame();
        assert!(anim.stop());
        assert!(!anim.stop());
        assert_eq!(anim.frames(), 1);
        assert_eq!(anim.elapsed(), Duration::ZERO);
    }
}
