use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const SPINNER_WIDTH: usize = 20;

/// A marker bouncing between the two ends of a bar.
#[derive(Debug, Clone)]
pub struct Spinner {
    width: usize,
    pos: usize,
    forward: bool,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(SPINNER_WIDTH)
    }
}

impl Spinner {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(2),
            pos: 0,
            forward: true,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The current bar, e.g. `"- # - -"`.
    pub fn frame(&self) -> String {
        (0..self.width)
            .map(|cell| if cell == self.pos { "#" } else { "-" })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn advance(&mut self) {
        if self.forward {
            self.pos += 1;
        } else {
            self.pos -= 1;
        }
        if self.pos == self.width - 1 || self.pos == 0 {
            self.forward = !self.forward;
        }
    }

    /// Redraws the bar on stdout every `tick` until `stop` fires.
    pub async fn run(mut self, tick: Duration, stop: CancellationToken) {
        let mut ticker = tokio::time::interval(tick);
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {
                    let mut out = std::io::stdout().lock();
                    let _ = write!(out, "{} \r", self.frame());
                    let _ = out.flush();
                    self.advance();
                }
            }
        }
        println!();
    }
}
