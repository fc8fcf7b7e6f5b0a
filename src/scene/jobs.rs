use std::sync::mpsc::{Receiver, Sender, channel};

use crate::foundation::core::Point;
use crate::foundation::error::EaselResult;
use crate::foundation::ids::{LayerId, NodeId};
use crate::raster::bitmap::Bitmap;

/// Where a finished image job lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageTarget {
    /// Replace the image of an existing node, if its image generation still matches.
    ReplaceImage { node: NodeId, generation: u64 },
    /// Create an image node at `anchor` on `layer` (or the active layer).
    NewImageNode {
        layer: Option<LayerId>,
        anchor: Point,
    },
}

#[derive(Debug)]
pub struct ImageCompletion {
    pub target: ImageTarget,
    pub result: EaselResult<Bitmap>,
}

/// Image decode and filter work executed on the rayon pool.
///
/// Results come back through a completion queue that the owner drains on its own thread, so
/// scene state is only ever touched from one place.
pub struct ImageJobs {
    tx: Sender<ImageCompletion>,
    rx: Receiver<ImageCompletion>,
    in_flight: usize,
}

impl Default for ImageJobs {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageJobs {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn spawn<F>(&mut self, target: ImageTarget, job: F)
    where
        F: FnOnce() -> EaselResult<Bitmap> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        rayon::spawn(move || {
            let result = job();
            // The receiver only disappears with the owner; nothing left to notify then.
            let _ = tx.send(ImageCompletion { target, result });
        });
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Completions that are ready now, without blocking.
    pub fn drain(&mut self) -> Vec<ImageCompletion> {
        let mut out = Vec::new();
        while let Ok(c) = self.rx.try_recv() {
            out.push(c);
        }
        self.in_flight = self.in_flight.saturating_sub(out.len());
        out
    }

    /// Block until every spawned job has reported.
    pub fn wait(&mut self) -> Vec<ImageCompletion> {
        let mut out = Vec::new();
        while self.in_flight > 0 {
            match self.rx.recv() {
                Ok(c) => {
                    self.in_flight -= 1;
                    out.push(c);
                }
                Err(_) => break,
            }
        }
        out
    }
}
