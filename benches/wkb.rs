use geo::polygon;

use criterion::{criterion_group, criterion_main, Criterion};
use geostream::driver::Driver;
use geostream::handler::VoidHandler;
use geostream::io::geometry_vector::{GeometryVector, GeometryVectorReader};
use geostream::io::wkb::{WkbReader, WkbWriter, WkbWriterOptions};
use geostream::io::wkt::WktWriter;

fn create_data() -> GeometryVector {
    // An L shape
    // https://github.com/georust/geo/blob/7cb7d0ffa6bf1544c5ca9922bd06100c36f815d7/README.md?plain=1#L40
    let poly = polygon![
        (x: 0.0, y: 0.0),
        (x: 4.0, y: 0.0),
        (x: 4.0, y: 1.0),
        (x: 1.0, y: 1.0),
        (x: 1.0, y: 4.0),
        (x: 0.0, y: 4.0),
        (x: 0.0, y: 0.0),
    ];
    vec![Some(geo::Geometry::Polygon(poly)); 1000]
        .into_iter()
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let data = create_data();
    let wkb = Driver::new(GeometryVectorReader::new(&data))
        .run(WkbWriter::new(WkbWriterOptions::default()))
        .unwrap()
        .output;

    c.bench_function("write GeometryVector as WKB", |b| {
        b.iter(|| {
            let _wkb = Driver::new(GeometryVectorReader::new(&data))
                .run(WkbWriter::new(WkbWriterOptions::default()))
                .unwrap();
        })
    });
    c.bench_function("validate WKB", |b| {
        b.iter(|| {
            let _ = Driver::new(WkbReader::new(wkb.iter().map(Option::as_ref)))
                .run(VoidHandler::new())
                .unwrap();
        })
    });
    c.bench_function("convert WKB to WKT", |b| {
        b.iter(|| {
            let _wkt = Driver::new(WkbReader::new(wkb.iter().map(Option::as_ref)))
                .run(WktWriter::default())
                .unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
