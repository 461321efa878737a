use proptest::prelude::*;
use rsp_axis::{BinEdges, BinPosition};
use rsp_core::RspError;

fn increasing_edges() -> impl Strategy<Value = Vec<f64>> {
    (
        -1.0e3f64..1.0e3,
        prop::collection::vec(1.0e-3f64..10.0, 1..64),
    )
        .prop_map(|(start, steps)| {
            let mut edges = vec![start];
            for step in steps {
                let next = edges[edges.len() - 1] + step;
                edges.push(next);
            }
            edges
        })
}

proptest! {
    #[test]
    fn bin_count_is_one_less_than_edges(edges in increasing_edges()) {
        let count = edges.len();
        let binning = BinEdges::from_edges(edges).unwrap();
        prop_assert_eq!(binning.bin_count(), count - 1);
    }

    #[test]
    fn every_center_maps_to_its_bin(edges in increasing_edges()) {
        let binning = BinEdges::from_edges(edges).unwrap();
        for bin in 0..binning.bin_count() {
            prop_assert_eq!(binning.find_bin(binning.center(bin)), Some(bin));
        }
    }

    #[test]
    fn swapped_neighbours_fail(edges in increasing_edges().prop_filter("need 3 edges", |e| e.len() >= 3)) {
        let mut broken = edges.clone();
        broken.swap(1, 2);
        let result = BinEdges::from_edges(broken);
        prop_assert!(
            matches!(result, Err(RspError::Configuration(ref info)) if info.code == "non-increasing-edges")
        );
    }
}

#[test]
fn non_increasing_edges_fail_construction() {
    let err = BinEdges::from_edges(vec![5.0, 3.0, 9.0]).unwrap_err();
    assert_eq!(err.code(), "non-increasing-edges");
    assert_eq!(err.info().context.get("index").map(String::as_str), Some("1"));
}

#[test]
fn empty_and_single_edge_lists_fail() {
    assert_eq!(BinEdges::from_edges(vec![]).unwrap_err().code(), "too-few-edges");
    assert_eq!(BinEdges::from_edges(vec![1.0]).unwrap_err().code(), "too-few-edges");
    assert_eq!(
        BinEdges::from_edges(vec![0.0, f64::NAN]).unwrap_err().code(),
        "non-finite-edge"
    );
}

#[test]
fn locate_follows_half_open_bins() {
    let binning = BinEdges::from_edges(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(binning.locate(-0.1), BinPosition::Underflow);
    assert_eq!(binning.locate(0.0), BinPosition::Bin(0));
    assert_eq!(binning.locate(2.5), BinPosition::Bin(2));
    assert_eq!(binning.locate(3.0), BinPosition::Bin(3));
    assert_eq!(binning.locate(4.0), BinPosition::Overflow);
    assert_eq!(binning.find_bin_clamped(-7.0), 0);
    assert_eq!(binning.find_bin_clamped(7.0), 3);
    assert!(!binning.in_range(f64::NAN));
}

#[test]
fn linear_and_logarithmic_constructors() {
    let linear = BinEdges::linear(4, 0.0, 2.0).unwrap();
    assert_eq!(linear.edges(), &[0.0, 0.5, 1.0, 1.5, 2.0]);

    let log = BinEdges::logarithmic(3, 1.0, 1000.0).unwrap();
    assert_eq!(log.bin_count(), 3);
    assert_eq!(log.low_edge(), 1.0);
    assert_eq!(log.high_edge(), 1000.0);
    assert!((log.edges()[1] - 10.0).abs() < 1e-9);
    assert!((log.edges()[2] - 100.0).abs() < 1e-9);

    assert_eq!(BinEdges::logarithmic(3, 0.0, 10.0).unwrap_err().code(), "non-positive-minimum");
    assert_eq!(BinEdges::linear(0, 0.0, 1.0).unwrap_err().code(), "zero-bins");
    assert_eq!(BinEdges::linear(2, 1.0, 1.0).unwrap_err().code(), "invalid-range");
}

#[test]
fn underflow_and_overflow_extend_the_range() {
    let binning = BinEdges::linear(2, 0.0, 2.0)
        .unwrap()
        .with_underflow(-100.0)
        .unwrap()
        .with_overflow(100.0)
        .unwrap();
    assert_eq!(binning.bin_count(), 4);
    assert_eq!(binning.find_bin(-50.0), Some(0));
    assert_eq!(binning.find_bin(50.0), Some(3));

    let base = BinEdges::linear(2, 0.0, 2.0).unwrap();
    assert_eq!(base.clone().with_underflow(0.5).unwrap_err().code(), "invalid-underflow");
    assert_eq!(base.with_overflow(1.0).unwrap_err().code(), "invalid-overflow");
}

#[test]
fn deserialization_validates_edges() {
    let good: BinEdges = serde_json::from_str("[0.0, 1.0, 3.0]").unwrap();
    assert_eq!(good.width(1), 2.0);
    assert!(serde_json::from_str::<BinEdges>("[2.0, 1.0]").is_err());
}
