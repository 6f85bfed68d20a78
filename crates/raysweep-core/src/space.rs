//! The configuration space swept by one run.

use serde::{Deserialize, Serialize};

use crate::variant::Variant;

/// Render window dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One render to perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Configuration {
    /// Scene path as handed to the renderer, relative to its working directory.
    pub scene: String,
    pub size: WindowSize,
    pub samples: u32,
    pub bounces: u32,
    pub variant: Variant,
}

/// Axes of the sweep. Iteration order, outer to inner: window size, scene,
/// samples, bounces, variant.
#[derive(Debug, Clone, Default)]
pub struct ConfigSpace {
    pub scenes: Vec<String>,
    pub sizes: Vec<WindowSize>,
    pub samples: Vec<u32>,
    pub bounces: Vec<u32>,
    pub variants: Vec<Variant>,
}

impl ConfigSpace {
    /// Number of configurations `iter` yields.
    pub fn len(&self) -> usize {
        self.sizes.len()
            * self.scenes.len()
            * self.samples.len()
            * self.bounces.len()
            * self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily enumerate every combination exactly once. Calling this again
    /// yields the same sequence.
    pub fn iter(&self) -> impl Iterator<Item = Configuration> + '_ {
        self.sizes.iter().flat_map(move |&size| {
            self.scenes.iter().flat_map(move |scene| {
                self.samples.iter().flat_map(move |&samples| {
                    self.bounces.iter().flat_map(move |&bounces| {
                        self.variants.iter().map(move |&variant| Configuration {
                            scene: scene.clone(),
                            size,
                            samples,
                            bounces,
                            variant,
                        })
                    })
                })
            })
        })
    }
}
