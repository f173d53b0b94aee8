use std::thread;

use tinytiles::rewrite::rewrite_tile;
use tinytiles::tile::{self, Coord, Feature, Geometry, Layer};
use tinytiles::{KeepPatterns, RetentionPolicy, StyleModel};

fn style() -> StyleModel {
    StyleModel::from_json(
        r#"{"layers": [
            {"id": "roads", "source-layer": "roads", "filter": ["==", "class", "motorway"]},
            {"id": "places", "source-layer": "places", "filter": [">=", "rank", 3]}
        ]}"#,
    )
    .unwrap()
}

fn tile_with(layer: &str, attribute: &str) -> Vec<u8> {
    let feature = Feature::new(Geometry::Points(vec![Coord::new(16.0, 32.0)]))
        .with_property("class", "motorway")
        .with_property(attribute, 1_i64);
    tile::encode(&[Layer::new(layer, vec![feature])], false).unwrap()
}

#[test]
fn forked_policies_merge_drops_across_threads() {
    let policy = RetentionPolicy::new(&style(), KeepPatterns::default());

    let partitions = vec![
        vec![tile_with("roads", "oneway"), tile_with("water", "depth")],
        vec![tile_with("places", "rank"), tile_with("roads", "oneway")],
        vec![tile_with("landuse", "kind"), tile_with("water", "depth")],
        vec![tile_with("roads", "lanes")],
    ];

    let handles: Vec<_> = partitions
        .into_iter()
        .map(|tiles| {
            let mut worker = policy.fork();
            thread::spawn(move || {
                for data in &tiles {
                    rewrite_tile(data, false, &mut worker).unwrap();
                }
                worker.into_drops()
            })
        })
        .collect();

    let mut merged = policy;
    for handle in handles {
        merged.absorb(&handle.join().unwrap());
    }

    let mut layers: Vec<&str> = merged.drops().layers.iter().collect();
    layers.sort_unstable();
    assert_eq!(layers, vec!["landuse", "water"]);

    let mut attributes: Vec<&str> = merged.drops().attributes.iter().collect();
    attributes.sort_unstable();
    assert_eq!(attributes, vec!["lanes", "oneway"]);
}

#[test]
fn sequential_and_partitioned_runs_agree() {
    let tiles: Vec<Vec<u8>> = ["roads", "water", "places", "transit", "roads"]
        .iter()
        .zip(["oneway", "depth", "pop", "route", "ref_no"])
        .map(|(layer, attribute)| tile_with(layer, attribute))
        .collect();

    let mut sequential = RetentionPolicy::new(&style(), KeepPatterns::default());
    for data in &tiles {
        rewrite_tile(data, false, &mut sequential).unwrap();
    }

    let mut partitioned = RetentionPolicy::new(&style(), KeepPatterns::default());
    let drops: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = tiles
            .chunks(2)
            .map(|chunk| {
                let mut worker = partitioned.fork();
                scope.spawn(move || {
                    for data in chunk {
                        rewrite_tile(data, false, &mut worker).unwrap();
                    }
                    worker.into_drops()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for log in &drops {
        partitioned.absorb(log);
    }

    // chunks are merged in order, so discovery order matches too
    let seq: Vec<&str> = sequential.drops().layers.iter().collect();
    let par: Vec<&str> = partitioned.drops().layers.iter().collect();
    assert_eq!(seq, par);
    let seq: Vec<&str> = sequential.drops().attributes.iter().collect();
    let par: Vec<&str> = partitioned.drops().attributes.iter().collect();
    assert_eq!(seq, par);
}
