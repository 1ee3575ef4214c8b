use crate::datatypes::{Dimension, GeometryType};
use crate::error::Result;
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};

/// Records the header of the outermost geometry of every feature.
///
/// After the outer `geometry_start` the handler returns [Continuation::AbortFeature], so readers
/// never decode the coordinates.
#[derive(Debug, Clone, Default)]
pub struct MetaHandler {
    metas: Vec<Option<GeometryMeta>>,
}

impl MetaHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for MetaHandler {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        self.metas.clear();
        if let Some(size) = meta.size {
            self.metas.try_reserve(size)?;
        }
        Ok(Continuation::Continue)
    }

    fn null_feature(&mut self, _feat_id: usize) -> HandlerResult {
        self.metas.push(None);
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        if part_id.is_some() {
            return Ok(Continuation::Continue);
        }
        self.metas.push(Some(*meta));
        Ok(Continuation::AbortFeature)
    }

    fn feature_abandoned(&mut self, feat_id: usize) {
        if self.metas.len() <= feat_id {
            self.metas.push(None);
        }
    }
}

impl Finish for MetaHandler {
    type Output = Vec<Option<GeometryMeta>>;

    fn finish(self) -> Result<Self::Output> {
        Ok(self.metas)
    }
}

/// Summarizes a vector from its headers: the geometry type and dimension shared by all features
/// and the number of features.
///
/// Like [MetaHandler], every feature is abandoned after its outer `geometry_start`.
#[derive(Debug, Clone, Default)]
pub struct VectorMetaHandler {
    meta: VectorMeta,
    features: usize,
    seen_geometry: bool,
    mixed_type: bool,
}

impl VectorMetaHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for VectorMetaHandler {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        *self = Self {
            meta: *meta,
            ..Default::default()
        };
        Ok(Continuation::Continue)
    }

    fn feature_start(&mut self, _feat_id: usize) -> HandlerResult {
        self.features += 1;
        Ok(Continuation::Continue)
    }

    fn null_feature(&mut self, _feat_id: usize) -> HandlerResult {
        self.features += 1;
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        if part_id.is_some() {
            return Ok(Continuation::Continue);
        }

        if !self.seen_geometry {
            self.seen_geometry = true;
            self.meta.geometry_type = Some(meta.geometry_type);
            self.meta.dimension = Some(meta.dimension);
        } else {
            if self.meta.geometry_type != Some(meta.geometry_type) {
                self.mixed_type = true;
            }
            let dim = self.meta.dimension.unwrap_or(Dimension::XY);
            self.meta.dimension = Some(dim.union(meta.dimension));
        }

        Ok(Continuation::AbortFeature)
    }
}

impl Finish for VectorMetaHandler {
    type Output = VectorMeta;

    fn finish(self) -> Result<VectorMeta> {
        let geometry_type: Option<GeometryType> = if self.mixed_type {
            None
        } else {
            self.meta.geometry_type
        };
        Ok(VectorMeta {
            geometry_type,
            dimension: self.meta.dimension,
            size: Some(self.features),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::Driver;
    use crate::handler::CountHandler;
    use crate::io::wkt::WktReader;

    const WKT: [Option<&str>; 4] = [
        Some("SRID=4326;POINT Z (1 2 3)"),
        None,
        Some("MULTIPOINT ((1 2), (3 4))"),
        Some("LINESTRING EMPTY"),
    ];

    #[test]
    fn per_feature_meta() {
        let metas = Driver::new(WktReader::new(WKT))
            .run(MetaHandler::new())
            .unwrap()
            .output;

        assert_eq!(metas.len(), 4);
        let first = metas[0].unwrap();
        assert_eq!(first.geometry_type, GeometryType::Point);
        assert_eq!(first.dimension, Dimension::XYZ);
        assert_eq!(first.srid, Some(4326));
        assert_eq!(first.size, Some(1));
        assert!(metas[1].is_none());
        assert_eq!(metas[2].unwrap().geometry_type, GeometryType::MultiPoint);
        assert!(metas[3].unwrap().is_empty());
    }

    #[test]
    fn vector_meta_is_mixed() {
        let meta = Driver::new(WktReader::new(WKT))
            .run(VectorMetaHandler::new())
            .unwrap()
            .output;
        assert_eq!(meta.geometry_type, None);
        assert_eq!(meta.dimension, Some(Dimension::XYZ));
        assert_eq!(meta.size, Some(4));
    }

    #[test]
    fn vector_meta_is_uniform() {
        let wkt = [Some("POINT (1 2)"), Some("POINT M (1 2 3)")];
        let meta = Driver::new(WktReader::new(wkt))
            .run(VectorMetaHandler::new())
            .unwrap()
            .output;
        assert_eq!(meta.geometry_type, Some(GeometryType::Point));
        assert_eq!(meta.dimension, Some(Dimension::XYM));
    }

    #[test]
    fn meta_handlers_skip_coordinates() {
        // A feature abandoned after its header never reaches the coordinate calls, so a
        // malformed tail is never seen.
        let wkt = [Some("LINESTRING (0 0, 1 banana)")];
        let metas = Driver::new(WktReader::new(wkt))
            .run(MetaHandler::new())
            .unwrap()
            .output;
        assert_eq!(metas[0].unwrap().geometry_type, GeometryType::LineString);

        let counts = Driver::new(WktReader::new(wkt)).run(CountHandler::new());
        assert!(counts.is_err());
    }
}
