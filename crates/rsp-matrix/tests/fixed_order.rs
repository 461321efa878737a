use std::sync::Arc;

use proptest::prelude::*;
use rsp_axis::BinEdges;
use rsp_core::{CollectingSink, Diagnostic, EngineConfig, Extrapolation, RspError, ValueAnchor};
use rsp_matrix::{FixedMatrix, OrderedMatrix};

fn edges(values: &[f64]) -> BinEdges {
    BinEdges::from_edges(values.to_vec()).unwrap()
}

fn scenario_matrix(anchor: ValueAnchor) -> FixedMatrix<1> {
    let mut matrix = FixedMatrix::<1>::with_axes("scenario", [edges(&[0.0, 1.0, 2.0, 3.0, 4.0])]).unwrap();
    matrix.set_anchor(anchor);
    for (bin, value) in [10.0, 20.0, 30.0, 40.0].into_iter().enumerate() {
        matrix.set_bin_content([bin], value);
    }
    matrix
}

#[test]
fn lookup_returns_bin_below() {
    let matrix = scenario_matrix(ValueAnchor::BinCenters);
    assert_eq!(matrix.get([2.5]), 30.0);
    assert_eq!(matrix.get([3.0]), 40.0);
    assert_eq!(matrix.get([-5.0]), 10.0);
    assert_eq!(matrix.get([100.0]), 40.0);
}

#[test]
fn centered_interpolation_runs_between_centers() {
    let matrix = scenario_matrix(ValueAnchor::BinCenters);
    assert_eq!(matrix.get_interpolated([1.5], Extrapolation::Clamp), 20.0);
    assert_eq!(matrix.get_interpolated([2.0], Extrapolation::Clamp), 25.0);
    assert_eq!(matrix.get_interpolated([0.2], Extrapolation::Clamp), 10.0);
    assert_eq!(matrix.get_interpolated([0.0], Extrapolation::Linear), 5.0);
    assert_eq!(matrix.get_interpolated([3.9], Extrapolation::Clamp), 40.0);
    assert_eq!(matrix.get_interpolated([4.0], Extrapolation::Linear), 45.0);
}

#[test]
fn edge_anchored_interpolation_uses_edge_knots() {
    let matrix = scenario_matrix(ValueAnchor::BinEdges);
    assert_eq!(matrix.get_interpolated([1.5], Extrapolation::Clamp), 25.0);
    assert_eq!(matrix.get_interpolated([0.0], Extrapolation::Clamp), 10.0);
    assert_eq!(matrix.get_interpolated([-1.0], Extrapolation::Clamp), 10.0);
    assert_eq!(matrix.get_interpolated([-1.0], Extrapolation::Linear), 0.0);
    assert_eq!(matrix.get_interpolated([3.5], Extrapolation::Clamp), 40.0);
    assert_eq!(matrix.get_interpolated([3.5], Extrapolation::Linear), 45.0);
}

#[test]
fn single_bin_axes_return_their_value() {
    let mut matrix = FixedMatrix::<1>::with_axes("one", [edges(&[0.0, 10.0])]).unwrap();
    matrix.set_bin_content([0], 7.0);
    assert_eq!(matrix.get_interpolated([-3.0], Extrapolation::Linear), 7.0);
    assert_eq!(matrix.get_interpolated([5.0], Extrapolation::Clamp), 7.0);
}

#[test]
fn bilinear_interpolation_is_exact_on_planes() {
    let axis = edges(&[0.0, 1.0, 2.0, 3.0]);
    let mut matrix = FixedMatrix::<2>::with_axes("plane", [axis.clone(), axis.clone()]).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            let value = axis.center(i) + 10.0 * axis.center(j);
            matrix.set_bin_content([i, j], value as f32);
        }
    }
    let value = matrix.get_interpolated([1.2, 1.7], Extrapolation::Clamp);
    assert!((value - 18.2).abs() < 1e-4, "got {value}");
}

#[test]
fn out_of_domain_fills_are_dropped_and_counted() {
    let sink = Arc::new(CollectingSink::new());
    let mut matrix = OrderedMatrix::with_axes("fill", vec![edges(&[0.0, 1.0, 2.0]), edges(&[0.0, 5.0])])
        .unwrap()
        .with_sink(sink.clone());

    assert!(matrix.add(&[0.5, 1.0], 2.0).unwrap());
    assert!(!matrix.add(&[2.0, 1.0], 3.0).unwrap());
    assert!(!matrix.add(&[0.5, -1.0], 4.0).unwrap());
    assert!(!matrix.add(&[f64::NAN, 1.0], 1.0).unwrap());

    assert_eq!(matrix.sum(), 2.0);
    let stats = matrix.drop_stats();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.mass, 8.0);

    let events = sink.drain();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], Diagnostic::Dropped { matrix, value, .. } if matrix == "fill" && *value == 3.0));
}

#[test]
fn coordinate_arity_is_checked() {
    let mut matrix = OrderedMatrix::with_axes("arity", vec![edges(&[0.0, 1.0])]).unwrap();
    assert!(matches!(
        matrix.add(&[0.5, 0.5], 1.0),
        Err(RspError::Value(info)) if info.code == "coordinate-arity"
    ));
    assert!(matrix.get(&[]).is_err());
}

#[test]
#[should_panic(expected = "bin-out-of-range")]
fn direct_writes_outside_the_axes_panic() {
    let mut matrix = FixedMatrix::<2>::with_axes("strict", [edges(&[0.0, 1.0]), edges(&[0.0, 1.0, 2.0])]).unwrap();
    matrix.set_bin_content([0, 2], 1.0);
}

#[test]
fn try_bin_content_reports_bounds() {
    let matrix = OrderedMatrix::with_axes("strict", vec![edges(&[0.0, 1.0])]).unwrap();
    let err = matrix.try_bin_content(&[1]).unwrap_err();
    assert!(matches!(&err, RspError::Bounds(info) if info.code == "bin-out-of-range"));
    assert_eq!(err.info().context.get("matrix").map(String::as_str), Some("strict"));
    assert_eq!(err.info().context.get("axis").map(String::as_str), Some("0"));
}

#[test]
fn orders_outside_one_to_seventeen_fail() {
    assert_eq!(OrderedMatrix::new("zero", 0).unwrap_err().code(), "invalid-order");
    assert_eq!(OrderedMatrix::new("big", 18).unwrap_err().code(), "invalid-order");
    assert_eq!(OrderedMatrix::new("max", 17).unwrap().order(), 17);
}

#[test]
fn resetting_axes_discards_values() {
    let mut matrix = OrderedMatrix::with_axes("reset", vec![edges(&[0.0, 1.0, 2.0])]).unwrap();
    matrix.add(&[0.5], 1.0).unwrap();
    matrix.set_axes(vec![edges(&[0.0, 1.0, 2.0, 3.0])]).unwrap();
    assert_eq!(matrix.sum(), 0.0);
    assert_eq!(matrix.bin_count(), 3);
    assert!(matrix.set_axes(vec![]).is_err());
}

#[test]
fn size_cap_is_enforced() {
    let config = EngineConfig {
        max_bins: 100,
        ..EngineConfig::default()
    };
    let mut matrix = OrderedMatrix::new("capped", 2).unwrap().with_config(&config);
    let ten = BinEdges::linear(10, 0.0, 1.0).unwrap();
    let eleven = BinEdges::linear(11, 0.0, 1.0).unwrap();
    assert!(matrix.set_axes(vec![ten.clone(), ten.clone()]).is_ok());
    let err = matrix.set_axes(vec![ten, eleven]).unwrap_err();
    assert_eq!(err.code(), "size-cap-exceeded");
    assert_eq!(err.info().context.get("matrix").map(String::as_str), Some("capped"));
}

#[test]
fn seventeen_axes_fill_and_reduce() {
    let axes = vec![edges(&[0.0, 1.0, 2.0]); 17];
    let mut matrix = OrderedMatrix::with_axes("deep", axes).unwrap();
    assert_eq!(matrix.bin_count(), 1 << 17);
    assert!(matrix.add(&[0.5; 17], 1.0).unwrap());
    assert!(matrix.add(&[1.5; 17], 2.0).unwrap());
    assert_eq!(matrix.get(&[1.5; 17]).unwrap(), 2.0);
    assert_eq!(matrix.bin_content(&[1; 17]), 2.0);

    let projected = matrix.sum_matrix(&[0, 16]).unwrap();
    assert_eq!(projected.order(), 2);
    assert_eq!(projected.sum(), 3.0);
    assert_eq!(projected.bin_content(&[0, 0]), 1.0);
    assert_eq!(projected.bin_content(&[1, 1]), 2.0);
}

#[test]
fn typed_projection_keeps_names_and_axes() {
    let mut matrix = FixedMatrix::<3>::with_axes(
        "typed",
        [edges(&[0.0, 1.0, 2.0]), edges(&[0.0, 1.0, 2.0, 3.0]), edges(&[0.0, 1.0])],
    )
    .unwrap();
    matrix.set_axis_names(["Energy", "Phi", "Psi"]);
    matrix.set_bin_content([1, 2, 0], 4.0);
    matrix.set_bin_content([0, 2, 0], 1.0);

    let reduced: FixedMatrix<1> = matrix.sum_matrix([1]).unwrap();
    assert_eq!(reduced.axis_names(), &["Phi".to_string()]);
    assert_eq!(reduced.axes()[0].bin_count(), 3);
    assert_eq!(reduced.bin_content([2]), 5.0);

    assert_eq!(matrix.sum_matrix([2, 1]).unwrap_err().code(), "axis-selection");
    assert_eq!(matrix.sum_matrix([3]).unwrap_err().code(), "axis-out-of-range");
}

#[test]
fn conversion_checks_order() {
    let ordered = OrderedMatrix::new("two", 2).unwrap();
    assert!(FixedMatrix::<2>::try_from(ordered.clone()).is_ok());
    let err = FixedMatrix::<3>::try_from(ordered).unwrap_err();
    assert_eq!(err.code(), "order-mismatch");
}

#[test]
fn statistics_report_mirrors_contents() {
    let mut matrix = scenario_matrix(ValueAnchor::BinCenters);
    matrix.set_axis_names(["Energy"]);
    matrix.set_bin_content([3], 0.0);
    let stats = matrix.statistics();
    assert_eq!(stats.bins, 4);
    assert_eq!(stats.nonzero_bins, 3);
    assert_eq!(stats.sum, 60.0);
    assert_eq!(stats.maximum, 30.0);
    assert_eq!(stats.minimum, 0.0);
    assert_eq!(stats.sparseness, 25.0);
    let text = stats.to_string();
    assert!(text.contains("Statistics for response matrix \"scenario\":"));
    assert!(text.contains("Number of non-zero bins:  3"));
    assert!(text.contains("x0:  Energy (from 0 to 4 with 4 bins)"));
}

fn three_axis_matrix() -> impl Strategy<Value = OrderedMatrix> {
    (1usize..5, 1usize..5, 1usize..5)
        .prop_flat_map(|(a, b, c)| {
            (
                Just((a, b, c)),
                prop::collection::vec(0.0f32..100.0, a * b * c),
            )
        })
        .prop_map(|((a, b, c), values)| {
            let axes = vec![
                BinEdges::linear(a, 0.0, 1.0).unwrap(),
                BinEdges::linear(b, 0.0, 1.0).unwrap(),
                BinEdges::linear(c, 0.0, 1.0).unwrap(),
            ];
            let mut matrix = OrderedMatrix::with_axes("random", axes).unwrap();
            matrix.values_mut().copy_from_slice(&values);
            matrix
        })
}

proptest! {
    #[test]
    fn projections_preserve_the_sum(matrix in three_axis_matrix()) {
        let total = matrix.sum();
        for keep in [vec![0], vec![1], vec![2], vec![0, 1], vec![0, 2], vec![1, 2]] {
            let projected = matrix.sum_matrix(&keep).unwrap();
            prop_assert!((projected.sum() - total).abs() <= 1e-3 * total.max(1.0));
        }
    }

    #[test]
    fn projection_onto_one_axis_sums_slices(matrix in three_axis_matrix()) {
        let projected = matrix.sum_matrix(&[2]).unwrap();
        let sizes: Vec<usize> = matrix.axes().iter().map(BinEdges::bin_count).collect();
        for k in 0..sizes[2] {
            let mut expected = 0.0f64;
            for j in 0..sizes[1] {
                for i in 0..sizes[0] {
                    expected += f64::from(matrix.bin_content(&[i, j, k]));
                }
            }
            prop_assert!((f64::from(projected.bin_content(&[k])) - expected).abs() <= 1e-3 * expected.max(1.0));
        }
    }
}
