use crate::errors::EnvError;
use crate::value_objects::bar::Bar;

/// Random-access, finite, ordered sequence of bars. Read-only.
pub trait MarketDataFeed {
    fn bar_at(&self, index: usize) -> Result<&Bar, EnvError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct VecBarFeed {
    bars: Vec<Bar>,
}

impl VecBarFeed {
    /// Re-indexes the bars by position so `bar.index` always matches `bar_at`.
    pub fn new(mut bars: Vec<Bar>) -> Result<Self, EnvError> {
        if bars.is_empty() {
            return Err(EnvError::EmptyDataset);
        }
        for (idx, bar) in bars.iter_mut().enumerate() {
            bar.index = idx;
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

impl MarketDataFeed for VecBarFeed {
    fn bar_at(&self, index: usize) -> Result<&Bar, EnvError> {
        self.bars.get(index).ok_or(EnvError::OutOfRange {
            index,
            length: self.bars.len(),
        })
    }

    fn len(&self) -> usize {
        self.bars.len()
    }
}

impl<F: MarketDataFeed + ?Sized> MarketDataFeed for &F {
    fn bar_at(&self, index: usize) -> Result<&Bar, EnvError> {
        (**self).bar_at(index)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
