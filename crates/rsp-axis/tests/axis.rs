use rsp_axis::{checked_bin_product, Axis, BinEdges, FisbelBinning};
use rsp_core::RspError;

#[test]
fn equality_ignores_names() {
    let energy = Axis::linear("Energy", 4, 0.0, 4.0).unwrap();
    let other = Axis::from_edges("Something else", vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(energy, other);
    assert!(energy.same_binning(&other));
    let coarser = Axis::linear("Energy", 2, 0.0, 4.0).unwrap();
    assert_ne!(energy, coarser);
}

#[test]
fn construction_errors_name_the_axis() {
    let err = Axis::from_edges("Energy", vec![5.0, 3.0, 9.0]).unwrap_err();
    assert!(matches!(&err, RspError::Configuration(info) if info.code == "non-increasing-edges"));
    assert_eq!(err.info().context.get("axis").map(String::as_str), Some("Energy"));
}

#[test]
fn lookups_check_dimension() {
    let energy = Axis::new("Energy", BinEdges::linear(4, 0.0, 4.0).unwrap());
    assert_eq!(energy.dimension(), 1);
    assert_eq!(energy.find_bin(&[2.5]), Some(2));
    assert_eq!(energy.find_bin(&[2.5, 1.0]), None);
    assert!(!energy.in_range(&[4.0]));
    assert_eq!(energy.area(1), 1.0);

    let sky = Axis::fisbel("Phi", "Theta", FisbelBinning::new(4).unwrap());
    assert_eq!(sky.dimension(), 2);
    assert_eq!(sky.bin_count(), 4);
    assert_eq!(sky.names(), &["Phi".to_string(), "Theta".to_string()]);
    assert_eq!(sky.find_bin(&[0.1, 0.0]), Some(0));
    assert_eq!(sky.find_bin(&[0.1]), None);
    assert!((sky.area(0) - std::f64::consts::PI).abs() < 1e-12);
    assert_eq!(sky.minima().len(), 2);
    assert!(sky.edges().is_none());
}

#[test]
fn bin_product_respects_cap() {
    assert_eq!(checked_bin_product([10, 10, 10], 1000).unwrap(), 1000);
    let err = checked_bin_product([10, 10, 11], 1000).unwrap_err();
    assert_eq!(err.code(), "size-cap-exceeded");
    assert_eq!(err.info().context.get("axis").map(String::as_str), Some("2"));
    assert!(checked_bin_product([usize::MAX, usize::MAX], u64::MAX - 1).is_err());
}
