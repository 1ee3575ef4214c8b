use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::Result;
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};

/// The number of geometries (including nested parts), rings and coordinates in one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureCount {
    pub geometries: usize,
    pub rings: usize,
    pub coords: usize,
}

/// Output of a [CountHandler].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counts {
    /// Every feature seen, null or not.
    pub features: usize,
    pub null_features: usize,
    /// One entry per feature in vector order. Null features count as all zeros.
    pub per_feature: Vec<FeatureCount>,
}

/// Counts features, and the geometries, rings and coordinates within each of them.
#[derive(Debug, Clone, Default)]
pub struct CountHandler {
    counts: Counts,
}

impl CountHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> Option<&mut FeatureCount> {
        self.counts.per_feature.last_mut()
    }
}

impl Handler for CountHandler {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        self.counts = Counts::default();
        if let Some(size) = meta.size {
            self.counts.per_feature.try_reserve(size)?;
        }
        Ok(Continuation::Continue)
    }

    fn feature_start(&mut self, _feat_id: usize) -> HandlerResult {
        self.counts.features += 1;
        self.counts.per_feature.push(FeatureCount::default());
        Ok(Continuation::Continue)
    }

    fn null_feature(&mut self, _feat_id: usize) -> HandlerResult {
        self.counts.features += 1;
        self.counts.null_features += 1;
        self.counts.per_feature.push(FeatureCount::default());
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, _meta: &GeometryMeta, _part_id: Option<usize>) -> HandlerResult {
        if let Some(count) = self.current() {
            count.geometries += 1;
        }
        Ok(Continuation::Continue)
    }

    fn ring_start(
        &mut self,
        _meta: &GeometryMeta,
        _size: Option<usize>,
        _ring_id: usize,
    ) -> HandlerResult {
        if let Some(count) = self.current() {
            count.rings += 1;
        }
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, _meta: &GeometryMeta, _coord: &Coord, _coord_id: usize) -> HandlerResult {
        if let Some(count) = self.current() {
            count.coords += 1;
        }
        Ok(Continuation::Continue)
    }
}

impl Finish for CountHandler {
    type Output = Counts;

    fn finish(self) -> Result<Counts> {
        Ok(self.counts)
    }
}
